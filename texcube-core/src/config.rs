/// Component inputs and their defaults
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_TEXTURE: &str = "assets/texture.jpg";

/// Inputs of the cube component.
///
/// Field names serialize in camelCase (`rotationSpeedX`, `cameraZ`, ...) so the
/// same keys work in TOML files and in the JSON options object handed over by
/// the browser. The clipping planes also accept the short `nearClipping` and
/// `farClipping` names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CubeConfig {
    /// Radians added to the x rotation every frame
    pub rotation_speed_x: f64,
    /// Radians added to the y rotation every frame
    pub rotation_speed_y: f64,
    /// Accepted and stored, but never applied to the geometry. The cube is
    /// always a unit box.
    pub size: f64,
    /// Texture path, resolved by the host against its asset root
    pub texture: String,
    pub camera_z: f64,
    /// Vertical field of view in degrees
    pub field_of_view: f64,
    #[serde(alias = "nearClipping")]
    pub near_clipping_plane: f64,
    #[serde(alias = "farClipping")]
    pub far_clipping_plane: f64,
}

impl CubeConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            rotation_speed_x: 0.005,
            rotation_speed_y: 0.001,
            size: 200.0,
            texture: DEFAULT_TEXTURE.to_string(),
            camera_z: 400.0,
            field_of_view: 1.0,
            near_clipping_plane: 1.0,
            far_clipping_plane: 1000.0,
        }
    }
}
