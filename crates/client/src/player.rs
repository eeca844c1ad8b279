use avian2d::prelude::{Collider, CollisionLayers, LayerMask, Position};
use bevy::prelude::{
    App, Changed, Children, Color, Commands, Component, Name, Plugin, PostUpdate, Query, Res,
    Resource, Sprite, Startup, Transform, Vec2, With, children, debug,
};

use shared::controller::PlayerController;
use shared::data::PlayerDataAsset;
use shared::movement::Facing;

use crate::level::GameLayer;

pub const PLAYER_SIZE: Vec2 = Vec2::new(0.8, 1.6);
pub const PLAYER_SPAWN: Vec2 = Vec2::new(0.0, 1.0);
pub const PLAYER_COLOR: Color = Color::srgb(0.2, 0.6, 0.9);

/// Tuning the player is spawned with.
#[derive(Resource, Clone, Debug, Default)]
pub struct PlayerConfig(pub PlayerDataAsset);

/// Sprite child that turns with the character's facing.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct PlayerVisual;

pub struct ClientPlayerPlugin;

impl Plugin for ClientPlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerConfig>();
        app.add_systems(Startup, spawn_player);
        app.add_systems(PostUpdate, sync_facing_visual);
    }
}

pub fn spawn_player(mut commands: Commands, config: Res<PlayerConfig>) {
    commands.spawn((
        Name::new("Player"),
        PlayerController::new(config.0.clone()),
        Position(PLAYER_SPAWN),
        Transform::from_translation(PLAYER_SPAWN.extend(1.0)),
        Collider::capsule(PLAYER_SIZE.x / 2.0, PLAYER_SIZE.y - PLAYER_SIZE.x),
        CollisionLayers::new(GameLayer::Character, LayerMask::ALL),
        children![(
            PlayerVisual,
            Sprite::from_color(PLAYER_COLOR, PLAYER_SIZE),
            Transform::default(),
        )],
    ));
}

pub fn sync_facing_visual(
    players: Query<(&Facing, &Children), Changed<Facing>>,
    mut visuals: Query<&mut Transform, With<PlayerVisual>>,
) {
    for (facing, children) in players.iter() {
        for child in children.iter() {
            if let Ok(mut transform) = visuals.get_mut(*child) {
                transform.rotation = facing.rotation();
                debug!("Player visual {:?} now facing {:?}", child, facing);
            }
        }
    }
}
