use bevy::prelude::{
    App, ButtonInput, Commands, Entity, GamepadButton, Has, KeyCode, MessageReader, Plugin, Query,
    Res, Update, With, debug, info,
};
use bevy::window::WindowFocused;
use leafwing_input_manager::prelude::{GamepadStick, VirtualDPad};

use shared::controller::{Inactive, InteractInput, PlayerController};
use shared::input::{
    ActionBinding, AxisSource, ButtonSource, INTERACT_ACTION_NAME, MOVE_ACTION_NAME,
    PlayerControls,
};

pub struct ClientInputPlugin;

impl Plugin for ClientInputPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<PlayerControls>() {
            app.insert_resource(default_player_controls());
        }
        app.add_systems(
            Update,
            (toggle_pause, handle_focus_change, log_interact_input),
        );
    }
}

pub fn default_player_controls() -> PlayerControls {
    PlayerControls::default()
        .with_action(
            MOVE_ACTION_NAME,
            ActionBinding::DualAxis(vec![
                AxisSource::DPad(VirtualDPad::wasd()),
                AxisSource::DPad(VirtualDPad::arrow_keys()),
                AxisSource::Stick(GamepadStick::LEFT),
            ]),
        )
        .with_action(
            INTERACT_ACTION_NAME,
            ActionBinding::Button(vec![
                ButtonSource::Key(KeyCode::KeyE),
                ButtonSource::Gamepad(GamepadButton::South),
            ]),
        )
}

/// Escape deactivates every player controller, or reactivates them if paused.
pub fn toggle_pause(
    keys: Res<ButtonInput<KeyCode>>,
    controllers: Query<(Entity, Has<Inactive>), With<PlayerController>>,
    mut commands: Commands,
) {
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }

    for (entity, inactive) in controllers.iter() {
        if inactive {
            commands.entity(entity).remove::<Inactive>();
        } else {
            commands.entity(entity).insert(Inactive);
        }
    }
}

/// Losing window focus deactivates the controllers so no key stays held.
pub fn handle_focus_change(
    mut focus_events: MessageReader<WindowFocused>,
    controllers: Query<(Entity, Has<Inactive>), With<PlayerController>>,
    mut commands: Commands,
) {
    for event in focus_events.read() {
        for (entity, inactive) in controllers.iter() {
            if event.focused && inactive {
                commands.entity(entity).remove::<Inactive>();
            } else if !event.focused && !inactive {
                debug!("Window lost focus, deactivating controller {:?}", entity);
                commands.entity(entity).insert(Inactive);
            }
        }
    }
}

fn log_interact_input(mut interacts: MessageReader<InteractInput>) {
    for interact in interacts.read() {
        info!(
            "Controller {:?} interact {}",
            interact.source,
            if interact.pressed { "pressed" } else { "released" }
        );
    }
}
