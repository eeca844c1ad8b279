//! Movement integration and ground detection for the player character.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::controller::{Inactive, InputSubscription, MoveInput};
use crate::data::{GroundLayerTest, PlayerData};

// ============================================================================
// COMPONENTS
// ============================================================================

/// Visual facing of the character, expressed as a yaw around the up axis.
#[derive(Component, Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

impl Facing {
    pub const LEFT_YAW_DEGREES: f32 = 0.0;
    pub const RIGHT_YAW_DEGREES: f32 = 180.0;

    pub fn yaw_degrees(self) -> f32 {
        match self {
            Facing::Left => Self::LEFT_YAW_DEGREES,
            Facing::Right => Self::RIGHT_YAW_DEGREES,
        }
    }

    pub fn rotation(self) -> Quat {
        Quat::from_rotation_y(self.yaw_degrees().to_radians())
    }
}

/// Per-tick movement state owned by the movement handler.
#[derive(Component, Reflect, Clone, Debug, Default, PartialEq)]
pub struct MovementState {
    move_input: Vec2,
    is_grounded: bool,
    ground_normal: Vec2,
}

impl MovementState {
    /// Always of length 0 or 1.
    pub fn move_input(&self) -> Vec2 {
        self.move_input
    }

    pub fn is_grounded(&self) -> bool {
        self.is_grounded
    }

    /// Normal of the surface under the character, zero while airborne.
    pub fn ground_normal(&self) -> Vec2 {
        self.ground_normal
    }

    pub(crate) fn clear_move_input(&mut self) {
        self.move_input = Vec2::ZERO;
    }

    fn apply_probe(&mut self, probe: GroundProbe) {
        self.is_grounded = probe.is_grounded;
        self.ground_normal = probe.normal;
    }
}

/// Marks the child entity that moves a player controller's body.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
#[require(MovementState)]
pub struct PlayerMovement {
    pub body: Entity,
}

// ============================================================================
// CAPABILITIES
// ============================================================================

/// A body that can be moved through the physics step rather than teleported.
pub trait CharacterBody {
    fn position(&self) -> Vec2;

    /// Request that the body ends the next physics step at `target`.
    fn move_position(&mut self, target: Vec2);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundHit {
    pub entity: Entity,
    pub distance: f32,
    pub normal: Vec2,
    /// Membership layers of the collider that was hit.
    pub layers: LayerMask,
}

pub trait GroundRaycaster {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<GroundHit>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GroundProbe {
    pub is_grounded: bool,
    pub normal: Vec2,
}

// ============================================================================
// PURE FUNCTIONS
// ============================================================================

/// Clamp to unit length, then normalize anything that is not zero.
pub fn sanitize_move_input(raw: Vec2) -> Vec2 {
    if !raw.is_finite() {
        return Vec2::ZERO;
    }

    // Huge components overflow the squared length; rescale them first.
    let raw = if raw.length_squared().is_finite() {
        raw
    } else {
        raw / raw.abs().max_element()
    };

    let clamped = raw.clamp_length_max(1.0);
    if clamped == Vec2::ZERO {
        return Vec2::ZERO;
    }
    clamped.try_normalize().unwrap_or(clamped)
}

/// A zero horizontal component keeps the current facing.
pub fn facing_for(horizontal: f32, current: Facing) -> Facing {
    if horizontal > 0.0 {
        Facing::Right
    } else if horizontal < 0.0 {
        Facing::Left
    } else {
        current
    }
}

pub fn on_move_input(state: &mut MovementState, facing: &mut Facing, raw: Vec2) {
    let move_input = sanitize_move_input(raw);
    *facing = facing_for(move_input.x, *facing);
    state.move_input = move_input;
}

pub fn position_delta(move_input: Vec2, move_speed: f32, dt: f32) -> Vec2 {
    move_input * (move_speed * dt)
}

/// Cast straight down from the body and decide whether it stands on ground.
pub fn ground_check(
    data: &PlayerData,
    position: Vec2,
    own_layers: LayerMask,
    raycaster: &impl GroundRaycaster,
) -> GroundProbe {
    if !data.enable_ground_check() {
        return GroundProbe::default();
    }

    let origin = position + data.ground_check_offset_2d();
    let mask = data.ground_layer_mask();

    let Some(hit) = raycaster.cast_ray(origin, Dir2::NEG_Y, data.ground_check_distance(), mask)
    else {
        return GroundProbe::default();
    };

    let is_grounded = match data.ground_layer_test() {
        GroundLayerTest::CharacterLayer => (own_layers & mask) == LayerMask::NONE,
        GroundLayerTest::HitLayer => (hit.layers & mask) != LayerMask::NONE,
    };

    if is_grounded {
        GroundProbe {
            is_grounded,
            normal: hit.normal,
        }
    } else {
        GroundProbe::default()
    }
}

/// One fixed simulation step: refresh grounded state, then move the body.
pub fn fixed_tick(
    state: &mut MovementState,
    data: &PlayerData,
    body: &mut impl CharacterBody,
    own_layers: LayerMask,
    raycaster: &impl GroundRaycaster,
    dt: f32,
) {
    state.apply_probe(ground_check(data, body.position(), own_layers, raycaster));

    let delta = position_delta(state.move_input, data.move_speed(), dt);
    let target = body.position() + delta;
    body.move_position(target);
}

// ============================================================================
// AVIAN ADAPTERS
// ============================================================================

/// Moves a dynamic body by driving its velocity for exactly one step.
pub struct VelocityDrivenBody<'a> {
    position: Vec2,
    velocity: &'a mut LinearVelocity,
    dt: f32,
}

impl<'a> VelocityDrivenBody<'a> {
    pub fn new(position: &Position, velocity: &'a mut LinearVelocity, dt: f32) -> Self {
        Self {
            position: position.0,
            velocity,
            dt,
        }
    }
}

impl CharacterBody for VelocityDrivenBody<'_> {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn move_position(&mut self, target: Vec2) {
        self.velocity.0 = if self.dt > 0.0 {
            (target - self.position) / self.dt
        } else {
            Vec2::ZERO
        };
    }
}

/// Casts against the physics world, never against the probing body itself.
pub struct SpatialGroundRaycaster<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    layers: &'a Query<'w, 's, &'static CollisionLayers>,
    excluded: Option<Entity>,
}

impl<'a, 'w, 's> SpatialGroundRaycaster<'a, 'w, 's> {
    pub fn new(
        spatial_query: &'a SpatialQuery<'w, 's>,
        layers: &'a Query<'w, 's, &'static CollisionLayers>,
    ) -> Self {
        Self {
            spatial_query,
            layers,
            excluded: None,
        }
    }

    pub fn excluding(mut self, body: Entity) -> Self {
        self.excluded = Some(body);
        self
    }
}

impl GroundRaycaster for SpatialGroundRaycaster<'_, '_, '_> {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        let filter = SpatialQueryFilter::from_mask(mask).with_excluded_entities(self.excluded);
        let hit = self
            .spatial_query
            .cast_ray(origin, direction, max_distance, true, &filter)?;

        let layers = self
            .layers
            .get(hit.entity)
            .copied()
            .unwrap_or_default()
            .memberships;

        Some(GroundHit {
            entity: hit.entity,
            distance: hit.distance,
            normal: hit.normal,
            layers,
        })
    }
}

// ============================================================================
// SYSTEMS
// ============================================================================

/// System: hand relayed move input to the handler subscribed to its source.
pub fn apply_move_input(
    mut move_inputs: MessageReader<MoveInput>,
    mut handlers: Query<(&InputSubscription, &PlayerMovement, &mut MovementState), Without<Inactive>>,
    mut facings: Query<&mut Facing>,
) {
    for message in move_inputs.read() {
        for (subscription, movement, mut state) in handlers.iter_mut() {
            if subscription.source != message.source {
                continue;
            }

            let Ok(mut facing) = facings.get_mut(movement.body) else {
                warn!("Movement handler body {:?} has no Facing", movement.body);
                continue;
            };

            on_move_input(&mut state, &mut facing, message.value);
        }
    }
}

/// System: ground check and position integration, once per fixed step.
pub fn player_fixed_tick(
    time: Res<Time>,
    spatial_query: SpatialQuery,
    layers: Query<&'static CollisionLayers>,
    mut handlers: Query<(&PlayerMovement, &PlayerData, &mut MovementState), Without<Inactive>>,
    mut bodies: Query<(&Position, &mut LinearVelocity)>,
) {
    let dt = time.delta_secs();

    for (movement, data, mut state) in handlers.iter_mut() {
        let Ok((position, mut velocity)) = bodies.get_mut(movement.body) else {
            continue;
        };
        let own_layers = layers
            .get(movement.body)
            .copied()
            .unwrap_or_default()
            .memberships;

        let raycaster =
            SpatialGroundRaycaster::new(&spatial_query, &layers).excluding(movement.body);
        let was_grounded = state.is_grounded();
        let mut body = VelocityDrivenBody::new(position, &mut velocity, dt);
        fixed_tick(&mut state, data, &mut body, own_layers, &raycaster, dt);

        if state.is_grounded() != was_grounded {
            debug!(
                "player_fixed_tick: body={:?} grounded={} normal={:?}",
                movement.body,
                state.is_grounded(),
                state.ground_normal()
            );
        }
    }
}

pub struct PlayerMovementPlugin;

impl Plugin for PlayerMovementPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<MovementState>()
            .register_type::<Facing>()
            .add_systems(FixedUpdate, player_fixed_tick);
    }
}

// ============================================================================
// TESTS
// ============================================================================
