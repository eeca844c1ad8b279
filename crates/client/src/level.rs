use avian2d::prelude::{Collider, CollisionLayers, LayerMask, PhysicsLayer, RigidBody};
use bevy::prelude::{
    App, Color, Commands, Component, Name, Plugin, Sprite, Startup, Transform, Vec2, info,
};

pub const GROUND_COLOR: Color = Color::srgb(0.35, 0.3, 0.25);

/// Layer assignment shared by the level and the player.
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    #[default]
    Character,
    Ground,
}

#[derive(Component, Clone, Copy, Debug, Default)]
pub struct GroundMarker;

/// Center and size of each static platform.
pub const PLATFORMS: [(Vec2, Vec2); 4] = [
    (Vec2::new(0.0, -0.5), Vec2::new(30.0, 1.0)),
    (Vec2::new(-8.0, 2.5), Vec2::new(4.0, 0.5)),
    (Vec2::new(6.0, 4.0), Vec2::new(5.0, 0.5)),
    (Vec2::new(0.0, 7.0), Vec2::new(3.0, 0.5)),
];

pub struct ClientLevelPlugin;

impl Plugin for ClientLevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_level);
    }
}

pub fn setup_level(mut commands: Commands) {
    for (index, (center, size)) in PLATFORMS.into_iter().enumerate() {
        commands.spawn((
            Name::new(format!("Platform {index}")),
            GroundMarker,
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            CollisionLayers::new(GameLayer::Ground, LayerMask::ALL),
            Sprite::from_color(GROUND_COLOR, size),
            Transform::from_translation(center.extend(0.0)),
        ));
    }

    info!("Level setup complete with {} platforms", PLATFORMS.len());
}
