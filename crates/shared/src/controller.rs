//! Player controller: owns the body and the input bindings, and relays input
//! to its movement handler as messages.
//!
//! Lifecycle:
//! - Adding [`PlayerController`] builds the data snapshot, resolves the input
//!   bindings, and locates or spawns the single movement handler child.
//! - Inserting [`Inactive`] disables the bindings and unsubscribes the handler.
//! - Removing [`Inactive`] enables the bindings and subscribes the handler again.

use avian2d::prelude::{GravityScale, LinearVelocity, LockedAxes, RigidBody};
use bevy::prelude::*;
use leafwing_input_manager::plugin::InputManagerSystem;
use leafwing_input_manager::prelude::ActionState;

use crate::data::{PlayerData, PlayerDataAsset};
use crate::error::ControllerError;
use crate::input::{InputMappingRefs, PlayerAction, PlayerControls, resolve_input_map};
use crate::movement::{Facing, MovementState, PlayerMovement, apply_move_input};

pub const MOVEMENT_HANDLER_NAME: &str = "PlayerMovementComponent";

#[derive(Component, Clone, Debug, Default)]
#[require(
    Transform,
    RigidBody = RigidBody::Dynamic,
    GravityScale = GravityScale(0.0),
    LockedAxes = LockedAxes::ROTATION_LOCKED,
    LinearVelocity,
    Facing,
    RelayedInput
)]
pub struct PlayerController {
    pub data: PlayerDataAsset,
}

impl PlayerController {
    pub fn new(data: PlayerDataAsset) -> Self {
        Self { data }
    }
}

/// Present on a controller, or mirrored onto its handler, while it is deactivated.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Inactive;

/// The movement handler spawned or found for a controller.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovementHandler(pub Entity);

/// A handler only receives input from the controller it is subscribed to.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputSubscription {
    pub source: Entity,
}

/// Last move value broadcast by a controller.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct RelayedInput {
    pub last_move: Vec2,
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct MoveInput {
    pub source: Entity,
    pub value: Vec2,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractInput {
    pub source: Entity,
    pub pressed: bool,
}

pub struct PlayerControllerPlugin;

impl Plugin for PlayerControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<MoveInput>();
        app.add_message::<InteractInput>();

        app.add_observer(setup_player_controller);
        app.add_observer(deactivate_controller);
        app.add_observer(reactivate_controller);

        app.add_systems(
            PreUpdate,
            (relay_player_input, apply_move_input)
                .chain()
                .after(InputManagerSystem::Update),
        );
    }
}

fn setup_player_controller(
    trigger: On<Add, PlayerController>,
    controllers: Query<(
        &PlayerController,
        Option<&InputMappingRefs>,
        Option<&Children>,
        Has<Inactive>,
    )>,
    handlers: Query<(), With<PlayerMovement>>,
    controls: Option<Res<PlayerControls>>,
    mut commands: Commands,
) {
    let entity = trigger.entity;
    let Ok((controller, refs, children, inactive)) = controllers.get(entity) else {
        error!("Player controller {:?} vanished before setup", entity);
        return;
    };

    let setup = ControllerSetup {
        entity,
        controller,
        refs,
        children,
        inactive,
        controls: controls.as_deref(),
    };

    match setup.run(&handlers, &mut commands) {
        Ok(handler) => info!(
            "Player controller {:?} ready, movement handler {:?}",
            entity, handler
        ),
        Err(err) => error!("Player controller {:?} setup failed: {}", entity, err),
    }
}

struct ControllerSetup<'a> {
    entity: Entity,
    controller: &'a PlayerController,
    refs: Option<&'a InputMappingRefs>,
    children: Option<&'a Children>,
    inactive: bool,
    controls: Option<&'a PlayerControls>,
}

impl ControllerSetup<'_> {
    /// Everything fallible happens before any command is queued.
    fn run(
        &self,
        handlers: &Query<(), With<PlayerMovement>>,
        commands: &mut Commands,
    ) -> Result<Entity, ControllerError> {
        let data = PlayerData::from_asset(&self.controller.data)?;
        let input_map = resolve_input_map(self.refs, self.controls)?;
        let handler = self.locate_or_create_handler(handlers, commands)?;

        let mut handler_commands = commands.entity(handler);
        handler_commands.insert((
            PlayerMovement { body: self.entity },
            data,
            MovementState::default(),
        ));
        if self.inactive {
            handler_commands.insert(Inactive);
        } else {
            handler_commands.insert(InputSubscription {
                source: self.entity,
            });
        }

        let mut action_state = ActionState::<PlayerAction>::default();
        if self.inactive {
            action_state.disable();
        } else {
            action_state.enable();
        }
        commands
            .entity(self.entity)
            .insert((input_map, action_state, MovementHandler(handler)));

        Ok(handler)
    }

    fn locate_or_create_handler(
        &self,
        handlers: &Query<(), With<PlayerMovement>>,
        commands: &mut Commands,
    ) -> Result<Entity, ControllerError> {
        let mut existing = self
            .children
            .into_iter()
            .flat_map(|children| children.iter())
            .filter(|child| handlers.contains(*child));

        if let Some(handler) = existing.next() {
            let extra = existing.count();
            if extra > 0 {
                warn!(
                    "Player controller {:?} has {} extra movement handlers, using {:?}",
                    self.entity, extra, handler
                );
            }
            return Ok(handler);
        }

        let mut controller_commands = commands.get_entity(self.entity).map_err(|_| {
            ControllerError::MovementHandlerUnavailable {
                controller: format!("{:?}", self.entity),
            }
        })?;

        let mut handler = None;
        controller_commands.with_children(|parent| {
            handler = Some(
                parent
                    .spawn((Name::new(MOVEMENT_HANDLER_NAME), Transform::default()))
                    .id(),
            );
        });

        handler.ok_or_else(|| ControllerError::MovementHandlerUnavailable {
            controller: format!("{:?}", self.entity),
        })
    }
}

fn deactivate_controller(
    trigger: On<Add, Inactive>,
    mut controllers: Query<
        (
            &mut ActionState<PlayerAction>,
            &mut RelayedInput,
            &mut LinearVelocity,
            &MovementHandler,
        ),
        With<PlayerController>,
    >,
    mut states: Query<&mut MovementState>,
    mut commands: Commands,
) {
    let entity = trigger.entity;
    let Ok((mut action_state, mut relayed, mut velocity, handler)) = controllers.get_mut(entity)
    else {
        return;
    };

    action_state.disable();
    relayed.last_move = Vec2::ZERO;
    // Motion is only ever requested one step at a time.
    velocity.0 = Vec2::ZERO;

    if let Ok(mut state) = states.get_mut(handler.0) {
        state.clear_move_input();
    }
    if let Ok(mut handler_commands) = commands.get_entity(handler.0) {
        handler_commands
            .try_remove::<InputSubscription>()
            .try_insert(Inactive);
    }

    debug!("Player controller {:?} deactivated", entity);
}

fn reactivate_controller(
    trigger: On<Remove, Inactive>,
    mut controllers: Query<(&mut ActionState<PlayerAction>, &MovementHandler), With<PlayerController>>,
    mut commands: Commands,
) {
    let entity = trigger.entity;
    let Ok((mut action_state, handler)) = controllers.get_mut(entity) else {
        return;
    };

    action_state.enable();

    if let Ok(mut handler_commands) = commands.get_entity(handler.0) {
        handler_commands
            .try_remove::<Inactive>()
            .try_insert(InputSubscription { source: entity });
    }

    debug!("Player controller {:?} activated", entity);
}

/// System: turn action state changes into move and interact messages.
pub fn relay_player_input(
    mut controllers: Query<
        (Entity, &ActionState<PlayerAction>, &mut RelayedInput),
        (With<PlayerController>, Without<Inactive>),
    >,
    mut move_writer: MessageWriter<MoveInput>,
    mut interact_writer: MessageWriter<InteractInput>,
) {
    for (entity, action_state, mut relayed) in controllers.iter_mut() {
        if action_state.disabled() {
            continue;
        }

        let value = action_state.axis_pair(&PlayerAction::Move);
        if value != relayed.last_move {
            relayed.last_move = value;
            move_writer.write(MoveInput {
                source: entity,
                value,
            });
        }

        if action_state.just_pressed(&PlayerAction::Interact) {
            debug!("relay_player_input: {:?} interact pressed", entity);
            interact_writer.write(InteractInput {
                source: entity,
                pressed: true,
            });
        }
        if action_state.just_released(&PlayerAction::Interact) {
            interact_writer.write(InteractInput {
                source: entity,
                pressed: false,
            });
        }
    }
}
