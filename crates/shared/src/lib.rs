pub mod controller;
pub mod data;
pub mod error;
pub mod input;
pub mod movement;

#[cfg(test)]
mod tests;

use avian2d::prelude::PhysicsPlugins;
use bevy::prelude::{Fixed, Plugin, Time};
use leafwing_input_manager::plugin::InputManagerPlugin;

use crate::controller::PlayerControllerPlugin;
use crate::input::PlayerAction;
use crate::movement::PlayerMovementPlugin;

pub const FIXED_TIMESTEP_HZ: f64 = 60.0;

/// Physics, input, and the player controller.
pub struct SharedPlugin;
impl Plugin for SharedPlugin {
    fn build(&self, app: &mut bevy::prelude::App) {
        app.insert_resource(Time::<Fixed>::from_hz(FIXED_TIMESTEP_HZ));
        app.add_plugins(PhysicsPlugins::default());
        app.add_plugins(InputManagerPlugin::<PlayerAction>::default());
        app.add_plugins((PlayerControllerPlugin, PlayerMovementPlugin));
    }
}

/// The controller logic without physics or device input, for hosts that bring their own.
pub struct PlayerLogicPlugin;
impl Plugin for PlayerLogicPlugin {
    fn build(&self, app: &mut bevy::prelude::App) {
        app.add_plugins((PlayerControllerPlugin, PlayerMovementPlugin));
    }
}
