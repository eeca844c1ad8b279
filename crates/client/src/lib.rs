use bevy::log::LogPlugin;
use bevy::prelude::{
    App, DefaultPlugins, MinimalPlugins, PluginGroup, Resource, Window, WindowPlugin, default,
};
use bevy::window::{ExitCondition, PresentMode};

use shared::SharedPlugin;
use shared::data::PlayerDataAsset;

use crate::input::ClientInputPlugin;
use crate::level::ClientLevelPlugin;
use crate::player::{ClientPlayerPlugin, PlayerConfig};
use crate::render::RenderPlugin;

pub mod input;
pub mod level;
pub mod player;
pub mod render;


#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct Headless(pub bool);

#[derive(Clone, Debug, Default)]
pub struct ClientSettings {
    pub player_data: PlayerDataAsset,
    pub headless: bool,
    pub inspector: bool,
    pub log_filter: Option<String>,
}

pub fn create_client_app(settings: ClientSettings) -> App {
    let mut app = App::new();
    app.insert_resource(Headless(settings.headless));

    if settings.headless {
        app.add_plugins((
            MinimalPlugins,
            bevy::diagnostic::DiagnosticsPlugin,
            bevy::asset::AssetPlugin::default(),
            bevy::scene::ScenePlugin,
            bevy::mesh::MeshPlugin,
            bevy::transform::TransformPlugin,
            bevy::input::InputPlugin,
            WindowPlugin {
                primary_window: None,
                exit_condition: ExitCondition::DontExit,
                ..default()
            },
        ));
        if let Some(filter) = settings.log_filter {
            app.add_plugins(LogPlugin {
                filter,
                ..default()
            });
        }
    } else {
        let mut log_plugin = LogPlugin::default();
        if let Some(filter) = settings.log_filter {
            log_plugin.filter = filter;
        }
        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Player Controller".to_string(),
                        resolution: (1280, 720).into(),
                        present_mode: PresentMode::AutoVsync,
                        ..default()
                    }),
                    ..default()
                })
                .set(log_plugin),
        );
    }

    app.insert_resource(PlayerConfig(settings.player_data));
    app.add_plugins(SharedPlugin);
    app.add_plugins(ClientInputPlugin);
    app.add_plugins(ClientLevelPlugin);
    app.add_plugins(ClientPlayerPlugin);

    if !settings.headless {
        app.add_plugins(RenderPlugin {
            debug: settings.inspector,
        });
    }

    app
}
