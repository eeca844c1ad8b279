//! Player tuning data: the serialized asset and the runtime snapshot built from it.

use std::path::Path;

use avian2d::prelude::LayerMask;
use bevy::prelude::{Component, Reflect, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ControllerError;

pub const DEFAULT_MOVE_SPEED: f32 = 5.0;
pub const DEFAULT_GROUND_CHECK_DISTANCE: f32 = 1.0;
/// Ground geometry sits on layer 1, characters on the default layer 0.
pub const DEFAULT_GROUND_LAYER_MASK: u32 = 1 << 1;

/// How a ray hit is turned into a grounded flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundLayerTest {
    /// Grounded when the character's own layers are outside the ground mask.
    /// This is the long-standing behavior; it never looks at what was hit.
    /// "Own layers" are the membership layers of the body's `CollisionLayers`,
    /// not those of the movement handler child, which carries no collider.
    #[default]
    CharacterLayer,
    /// Grounded when the collider that was hit belongs to the ground mask.
    HitLayer,
}

/// Tunable player parameters as authored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerDataAsset {
    pub move_speed: f32,
    pub enable_ground_check: bool,
    pub ground_layer_mask: u32,
    pub ground_check_distance: f32,
    pub ground_check_origin_offset: Vec3,
    pub ground_layer_test: GroundLayerTest,
}

impl Default for PlayerDataAsset {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            enable_ground_check: true,
            ground_layer_mask: DEFAULT_GROUND_LAYER_MASK,
            ground_check_distance: DEFAULT_GROUND_CHECK_DISTANCE,
            ground_check_origin_offset: Vec3::ZERO,
            ground_layer_test: GroundLayerTest::default(),
        }
    }
}

impl PlayerDataAsset {
    pub fn from_toml_str(source: &str) -> Result<Self, ControllerError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ControllerError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ControllerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Fail early on tuning the controller setup would refuse.
    pub fn validate(&self) -> Result<(), ControllerError> {
        PlayerData::from_asset(self).map(|_| ())
    }
}

/// Immutable runtime copy of [`PlayerDataAsset`], taken once when the controller is set up.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct PlayerData {
    move_speed: f32,
    enable_ground_check: bool,
    ground_layer_mask: LayerMask,
    ground_check_distance: f32,
    ground_check_origin_offset: Vec3,
    ground_layer_test: GroundLayerTest,
}

impl PlayerData {
    /// Negative or non-finite speeds and distances are rejected; zero is allowed.
    pub fn from_asset(asset: &PlayerDataAsset) -> Result<Self, ControllerError> {
        check_non_negative("move_speed", asset.move_speed)?;
        check_non_negative("ground_check_distance", asset.ground_check_distance)?;

        Ok(Self {
            move_speed: asset.move_speed,
            enable_ground_check: asset.enable_ground_check,
            ground_layer_mask: LayerMask(asset.ground_layer_mask),
            ground_check_distance: asset.ground_check_distance,
            ground_check_origin_offset: asset.ground_check_origin_offset,
            ground_layer_test: asset.ground_layer_test,
        })
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn enable_ground_check(&self) -> bool {
        self.enable_ground_check
    }

    pub fn ground_layer_mask(&self) -> LayerMask {
        self.ground_layer_mask
    }

    pub fn ground_check_distance(&self) -> f32 {
        self.ground_check_distance
    }

    pub fn ground_check_origin_offset(&self) -> Vec3 {
        self.ground_check_origin_offset
    }

    /// The offset projected onto the 2D simulation plane.
    pub fn ground_check_offset_2d(&self) -> Vec2 {
        self.ground_check_origin_offset.truncate()
    }

    pub fn ground_layer_test(&self) -> GroundLayerTest {
        self.ground_layer_test
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ControllerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ControllerError::InvalidConfig { field, value })
    }
}
