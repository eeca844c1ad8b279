mod controller_tests;

use std::time::Duration;

use avian2d::prelude::SpatialQueryPipeline;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use leafwing_input_manager::prelude::{ActionState, VirtualDPad};

use crate::PlayerLogicPlugin;
use crate::controller::{InteractInput, MoveInput, MovementHandler};
use crate::input::{
    ActionBinding, ButtonSource, AxisSource, INTERACT_ACTION_NAME, MOVE_ACTION_NAME,
    PlayerAction, PlayerControls,
};

pub(crate) const FIXED_STEP: Duration = Duration::from_millis(20);

#[derive(Resource, Default)]
pub(crate) struct CapturedInput {
    pub moves: Vec<MoveInput>,
    pub interacts: Vec<InteractInput>,
}

fn capture_input(
    mut moves: MessageReader<MoveInput>,
    mut interacts: MessageReader<InteractInput>,
    mut captured: ResMut<CapturedInput>,
) {
    captured.moves.extend(moves.read().copied());
    captured.interacts.extend(interacts.read().copied());
}

pub(crate) fn test_controls() -> PlayerControls {
    PlayerControls::default()
        .with_action(
            MOVE_ACTION_NAME,
            ActionBinding::DualAxis(vec![AxisSource::DPad(VirtualDPad::wasd())]),
        )
        .with_action(
            INTERACT_ACTION_NAME,
            ActionBinding::Button(vec![ButtonSource::Key(KeyCode::KeyE)]),
        )
}

/// Controller logic on a headless app, stepping exactly one 20ms fixed tick per update.
pub(crate) fn setup_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FIXED_STEP));
    app.insert_resource(Time::<Fixed>::from_duration(FIXED_STEP));
    app.init_resource::<SpatialQueryPipeline>();
    app.insert_resource(test_controls());
    app.add_plugins(PlayerLogicPlugin);
    app.init_resource::<CapturedInput>();
    app.add_systems(Update, capture_input);
    app
}

pub(crate) fn handler_of(app: &App, controller: Entity) -> Entity {
    app.world()
        .get::<MovementHandler>(controller)
        .expect("controller should have a movement handler")
        .0
}

pub(crate) fn set_move(app: &mut App, controller: Entity, value: Vec2) {
    app.world_mut()
        .get_mut::<ActionState<PlayerAction>>(controller)
        .expect("controller should have an action state")
        .set_axis_pair(&PlayerAction::Move, value);
}
