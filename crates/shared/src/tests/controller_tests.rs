//! Setup of the player controller and its input relay.

use avian2d::prelude::{LinearVelocity, Position, RigidBody};
use bevy::prelude::*;
use leafwing_input_manager::prelude::{ActionState, InputMap};

use super::{CapturedInput, handler_of, set_move, setup_test_app};
use crate::controller::{
    InputSubscription, MOVEMENT_HANDLER_NAME, MovementHandler, PlayerController,
};
use crate::data::{PlayerData, PlayerDataAsset};
use crate::input::{ActionBinding, AxisSource, ButtonSource, InputMappingRefs, PlayerAction, PlayerControls};
use crate::movement::{Facing, MovementState, PlayerMovement};

fn spawn_controller(app: &mut App) -> Entity {
    let controller = app
        .world_mut()
        .spawn((PlayerController::default(), Position(Vec2::ZERO)))
        .id();
    app.update();
    controller
}

fn handlers_under(app: &App, controller: Entity) -> Vec<Entity> {
    let Some(children) = app.world().get::<Children>(controller) else {
        return Vec::new();
    };
    children
        .iter()
        .filter(|child| app.world().get::<PlayerMovement>(*child).is_some())
        .collect()
}

#[test]
fn setup_spawns_exactly_one_movement_handler() {
    let mut app = setup_test_app();
    let controller = spawn_controller(&mut app);

    let handlers = handlers_under(&app, controller);
    assert_eq!(handlers.len(), 1, "expected one movement handler child");

    let handler = handlers[0];
    assert_eq!(handler_of(&app, controller), handler);

    let world = app.world();
    assert_eq!(
        world.get::<Name>(handler).map(|name| name.as_str()),
        Some(MOVEMENT_HANDLER_NAME)
    );
    assert_eq!(
        world.get::<PlayerMovement>(handler),
        Some(&PlayerMovement { body: controller })
    );
    assert_eq!(
        world.get::<InputSubscription>(handler),
        Some(&InputSubscription { source: controller })
    );
    assert_eq!(
        world.get::<PlayerData>(handler),
        Some(&PlayerData::from_asset(&PlayerDataAsset::default()).expect("default is valid"))
    );
}

#[test]
fn controller_body_is_a_weightless_dynamic_body() {
    let mut app = setup_test_app();
    let controller = spawn_controller(&mut app);

    let world = app.world();
    assert_eq!(world.get::<RigidBody>(controller), Some(&RigidBody::Dynamic));
    assert!(world.get::<InputMap<PlayerAction>>(controller).is_some());
    let action_state = world
        .get::<ActionState<PlayerAction>>(controller)
        .expect("action state inserted at setup");
    assert!(!action_state.disabled(), "bindings are enabled on activation");
}

#[test]
fn setup_reuses_an_existing_movement_handler() {
    let mut app = setup_test_app();
    let controller = app.world_mut().spawn(Position(Vec2::ZERO)).id();
    let existing = app
        .world_mut()
        .spawn((
            PlayerMovement {
                body: Entity::PLACEHOLDER,
            },
            ChildOf(controller),
        ))
        .id();

    app.world_mut()
        .entity_mut(controller)
        .insert(PlayerController::default());
    app.update();

    assert_eq!(handlers_under(&app, controller), vec![existing]);
    assert_eq!(handler_of(&app, controller), existing);
    assert_eq!(
        app.world().get::<PlayerMovement>(existing),
        Some(&PlayerMovement { body: controller })
    );
}

#[test]
fn missing_bindings_abort_setup_before_spawning_anything() {
    let mut app = setup_test_app();
    app.world_mut().remove_resource::<PlayerControls>();

    let controller = spawn_controller(&mut app);

    assert!(handlers_under(&app, controller).is_empty());
    assert!(app.world().get::<MovementHandler>(controller).is_none());
    assert!(
        app.world()
            .get::<ActionState<PlayerAction>>(controller)
            .is_none()
    );
}

#[test]
fn explicit_refs_are_enough_without_shared_controls() {
    let mut app = setup_test_app();
    app.world_mut().remove_resource::<PlayerControls>();

    let controller = app
        .world_mut()
        .spawn((
            PlayerController::default(),
            Position(Vec2::ZERO),
            InputMappingRefs {
                move_action: Some(ActionBinding::DualAxis(vec![AxisSource::DPad(
                    leafwing_input_manager::prelude::VirtualDPad::arrow_keys(),
                )])),
                interact_action: Some(ActionBinding::Button(vec![ButtonSource::Key(
                    KeyCode::Enter,
                )])),
            },
        ))
        .id();
    app.update();

    assert_eq!(handlers_under(&app, controller).len(), 1);
}

#[test]
fn invalid_config_aborts_setup() {
    let mut app = setup_test_app();
    let controller = app
        .world_mut()
        .spawn((
            PlayerController::new(PlayerDataAsset {
                move_speed: -3.0,
                ..Default::default()
            }),
            Position(Vec2::ZERO),
        ))
        .id();
    app.update();

    assert!(handlers_under(&app, controller).is_empty());
}

#[test]
fn move_is_broadcast_on_change_and_on_cancel() {
    let mut app = setup_test_app();
    let controller = spawn_controller(&mut app);

    set_move(&mut app, controller, Vec2::new(1.0, 0.0));
    app.update();
    app.update();
    set_move(&mut app, controller, Vec2::ZERO);
    app.update();

    let moves = &app.world().resource::<CapturedInput>().moves;
    let values: Vec<Vec2> = moves.iter().map(|message| message.value).collect();
    assert_eq!(values, vec![Vec2::new(1.0, 0.0), Vec2::ZERO]);
    assert!(moves.iter().all(|message| message.source == controller));
}

#[test]
fn interact_is_broadcast_on_press_and_release() {
    let mut app = setup_test_app();
    let controller = spawn_controller(&mut app);

    app.world_mut()
        .get_mut::<ActionState<PlayerAction>>(controller)
        .expect("action state")
        .press(&PlayerAction::Interact);
    app.update();
    app.world_mut()
        .get_mut::<ActionState<PlayerAction>>(controller)
        .expect("action state")
        .release(&PlayerAction::Interact);
    app.update();

    let pressed: Vec<bool> = app
        .world()
        .resource::<CapturedInput>()
        .interacts
        .iter()
        .map(|message| message.pressed)
        .collect();
    assert_eq!(pressed, vec![true, false]);
}

#[test]
fn handler_stores_normalized_input_and_turns_the_body() {
    let mut app = setup_test_app();
    let controller = spawn_controller(&mut app);
    let handler = handler_of(&app, controller);

    set_move(&mut app, controller, Vec2::new(0.3, 0.4));
    app.update();

    let state = app.world().get::<MovementState>(handler).expect("state");
    assert!((state.move_input() - Vec2::new(0.6, 0.8)).length() < 1e-5);
    assert_eq!(app.world().get::<Facing>(controller), Some(&Facing::Right));

    set_move(&mut app, controller, Vec2::new(0.0, 1.0));
    app.update();
    assert_eq!(
        app.world().get::<Facing>(controller),
        Some(&Facing::Right),
        "purely vertical input keeps facing"
    );

    set_move(&mut app, controller, Vec2::new(-2.0, 0.0));
    app.update();
    assert_eq!(app.world().get::<Facing>(controller), Some(&Facing::Left));
}

#[test]
fn fixed_tick_drives_body_velocity_from_move_speed() {
    let mut app = setup_test_app();
    let controller = spawn_controller(&mut app);
    let handler = handler_of(&app, controller);

    set_move(&mut app, controller, Vec2::new(1.0, 0.0));
    app.update();
    app.update();

    // 5 units/s for one 20ms step is a 0.1 displacement.
    let velocity = app.world().get::<LinearVelocity>(controller).expect("velocity");
    assert!((velocity.0 - Vec2::new(5.0, 0.0)).length() < 1e-4, "velocity={:?}", velocity.0);
    assert!(
        !app.world().get::<MovementState>(handler).expect("state").is_grounded(),
        "nothing to stand on in an empty world"
    );

    set_move(&mut app, controller, Vec2::ZERO);
    app.update();
    app.update();

    let velocity = app.world().get::<LinearVelocity>(controller).expect("velocity");
    assert_eq!(velocity.0, Vec2::ZERO);
}

#[test]
fn input_only_reaches_the_subscribed_handler() {
    let mut app = setup_test_app();
    let moving = spawn_controller(&mut app);
    let idle = spawn_controller(&mut app);
    let idle_handler = handler_of(&app, idle);

    set_move(&mut app, moving, Vec2::new(-1.0, 0.0));
    app.update();

    let idle_state = app.world().get::<MovementState>(idle_handler).expect("state");
    assert_eq!(idle_state.move_input(), Vec2::ZERO);
    assert_eq!(
        app.world().get::<MovementState>(handler_of(&app, moving)).expect("state").move_input(),
        Vec2::NEG_X
    );
}
