use std::collections::HashMap;

use bevy::prelude::{Component, GamepadButton, KeyCode, Reflect, Resource};
use leafwing_input_manager::Actionlike;
use leafwing_input_manager::prelude::{GamepadStick, InputMap, VirtualDPad};
use serde::{Deserialize, Serialize};

use crate::error::ControllerError;

pub const MOVE_ACTION_NAME: &str = "Move";
pub const INTERACT_ACTION_NAME: &str = "Interact";

#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Reflect, Serialize, Deserialize, Actionlike, Default,
)]
pub enum PlayerAction {
    #[default]
    #[actionlike(DualAxis)]
    Move,

    #[actionlike(Button)]
    Interact,
}

impl PlayerAction {
    pub const ALL: [PlayerAction; 2] = [PlayerAction::Move, PlayerAction::Interact];

    /// Name used to look the action up in a [`PlayerControls`] asset.
    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::Move => MOVE_ACTION_NAME,
            PlayerAction::Interact => INTERACT_ACTION_NAME,
        }
    }

    fn expected_kind(&self) -> &'static str {
        match self {
            PlayerAction::Move => "dual-axis",
            PlayerAction::Interact => "button",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AxisSource {
    DPad(VirtualDPad),
    Stick(GamepadStick),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ButtonSource {
    Key(KeyCode),
    Gamepad(GamepadButton),
}

/// The physical inputs bound to one action.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionBinding {
    DualAxis(Vec<AxisSource>),
    Button(Vec<ButtonSource>),
}

impl ActionBinding {
    fn kind(&self) -> &'static str {
        match self {
            ActionBinding::DualAxis(_) => "dual-axis",
            ActionBinding::Button(_) => "button",
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            ActionBinding::DualAxis(sources) => sources.is_empty(),
            ActionBinding::Button(sources) => sources.is_empty(),
        }
    }
}

/// Shared action-binding asset, looked up by action name.
#[derive(Resource, Clone, Debug, Default)]
pub struct PlayerControls {
    actions: HashMap<String, ActionBinding>,
}

impl PlayerControls {
    pub fn with_action(mut self, name: impl Into<String>, binding: ActionBinding) -> Self {
        self.actions.insert(name.into(), binding);
        self
    }

    pub fn find_action(&self, name: &str) -> Option<&ActionBinding> {
        self.actions.get(name)
    }
}

/// Explicit per-entity bindings. Any entry set here wins over [`PlayerControls`].
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct InputMappingRefs {
    pub move_action: Option<ActionBinding>,
    pub interact_action: Option<ActionBinding>,
}

impl InputMappingRefs {
    fn binding(&self, action: PlayerAction) -> Option<&ActionBinding> {
        match action {
            PlayerAction::Move => self.move_action.as_ref(),
            PlayerAction::Interact => self.interact_action.as_ref(),
        }
    }
}

/// Pick the binding for every [`PlayerAction`] and build the input map.
///
/// Fails on the first action that has no binding in either source, or whose
/// binding is of the wrong kind.
pub fn resolve_input_map(
    refs: Option<&InputMappingRefs>,
    controls: Option<&PlayerControls>,
) -> Result<InputMap<PlayerAction>, ControllerError> {
    let mut input_map = InputMap::<PlayerAction>::default();

    for action in PlayerAction::ALL {
        let binding = refs
            .and_then(|refs| refs.binding(action))
            .or_else(|| controls.and_then(|controls| controls.find_action(action.name())))
            .ok_or(ControllerError::InputBindingMissing {
                action: action.name(),
            })?;

        bind_action(&mut input_map, action, binding)?;
    }

    Ok(input_map)
}

fn bind_action(
    input_map: &mut InputMap<PlayerAction>,
    action: PlayerAction,
    binding: &ActionBinding,
) -> Result<(), ControllerError> {
    if binding.kind() != action.expected_kind() {
        return Err(ControllerError::BindingKindMismatch {
            action: action.name(),
            expected: action.expected_kind(),
        });
    }
    // An empty binding would leave the action silently dead.
    if binding.is_empty() {
        return Err(ControllerError::InputBindingMissing {
            action: action.name(),
        });
    }

    match binding {
        ActionBinding::DualAxis(sources) => {
            for source in sources {
                match source {
                    AxisSource::DPad(dpad) => input_map.insert_dual_axis(action, dpad.clone()),
                    AxisSource::Stick(stick) => input_map.insert_dual_axis(action, stick.clone()),
                };
            }
        }
        ActionBinding::Button(sources) => {
            for source in sources {
                match source {
                    ButtonSource::Key(key) => input_map.insert(action, *key),
                    ButtonSource::Gamepad(button) => input_map.insert(action, *button),
                };
            }
        }
    }

    Ok(())
}
