use avian2d::prelude::Position;
use bevy::camera::ScalingMode;
use bevy::prelude::{
    App, Camera, Camera2d, Color, Commands, Gizmos, Name, OrthographicProjection, Plugin,
    Projection, Query, Startup, Update, Vec2, default,
};
use bevy_inspector_egui::{
    bevy_egui::{EguiGlobalSettings, EguiPlugin, PrimaryEguiContext},
    quick::WorldInspectorPlugin,
};

use shared::data::PlayerData;
use shared::movement::{MovementState, PlayerMovement};

pub const VIEWPORT_HEIGHT: f32 = 12.0;
const PROBE_GROUNDED_COLOR: Color = Color::srgb(0.1, 0.9, 0.2);
const PROBE_AIRBORNE_COLOR: Color = Color::srgb(0.9, 0.1, 0.1);

pub struct RenderPlugin {
    /// World inspector and ground-probe gizmos.
    pub debug: bool,
}

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera);

        if self.debug {
            app.insert_resource(EguiGlobalSettings {
                auto_create_primary_context: false,
                ..Default::default()
            });
            app.add_plugins((EguiPlugin::default(), WorldInspectorPlugin::default()));
            app.add_systems(Update, draw_ground_probes);
        }
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("Camera"),
        Camera2d,
        Camera {
            order: 0,
            ..default()
        },
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: VIEWPORT_HEIGHT,
            },
            ..OrthographicProjection::default_2d()
        }),
        PrimaryEguiContext,
    ));
}

/// Draw each handler's ground ray, green while grounded.
pub fn draw_ground_probes(
    handlers: Query<(&PlayerMovement, &PlayerData, &MovementState)>,
    bodies: Query<&Position>,
    mut gizmos: Gizmos,
) {
    for (movement, data, state) in handlers.iter() {
        let Ok(position) = bodies.get(movement.body) else {
            continue;
        };
        if !data.enable_ground_check() {
            continue;
        }

        let origin = position.0 + data.ground_check_offset_2d();
        let end = origin - Vec2::Y * data.ground_check_distance();
        let color = if state.is_grounded() {
            PROBE_GROUNDED_COLOR
        } else {
            PROBE_AIRBORNE_COLOR
        };
        gizmos.line_2d(origin, end, color);
    }
}
