//! Runtime configuration for the blur screen.
//!
//! Every field has a default, so a JSON file only needs to name what it
//! overrides. Asset paths are relative to the resolved asset root.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail, ensure};
use serde::{Deserialize, Serialize};

use crate::data_structures::colour::Colour;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second.
    pub velocity: f32,
    pub degrees_per_pixel: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [20.0, 10.0, 20.0],
            target: [0.0, 0.0, 0.0],
            fov_y_degrees: 67.0,
            near: 0.05,
            far: 50.0,
            velocity: 5.0,
            degrees_per_pixel: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub ambient: [f32; 3],
    pub light_colour: [f32; 3],
    pub light_direction: [f32; 3],
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            ambient: [0.4, 0.4, 0.4],
            light_colour: [0.8, 0.8, 0.8],
            light_direction: [-1.0, -0.8, -0.2],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub window_title: String,
    /// Overrides the asset root lookup, see [`ScreenConfig::asset_root`].
    pub asset_dir: Option<PathBuf>,
    pub model: String,
    pub gui_texture: String,
    pub blur_vertex_shader: String,
    pub blur_fragment_shader: String,
    /// Horizontal + vertical pass pairs per blurred frame.
    pub ping_pong_count: u32,
    pub max_blur: f32,
    /// How fast the blur fades in after pausing, in full strength per second.
    pub blur_ramp_rate: f32,
    /// Size of the blur targets relative to the window.
    pub blur_scale: f32,
    pub clear_colour: Colour,
    pub camera: CameraConfig,
    pub environment: EnvironmentConfig,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            window_title: "pause-blur".to_string(),
            asset_dir: None,
            model: "models/Low poly House.obj".to_string(),
            gui_texture: "gui.png".to_string(),
            blur_vertex_shader: "shaders/blur.vert.wgsl".to_string(),
            blur_fragment_shader: "shaders/blur.frag.wgsl".to_string(),
            ping_pong_count: 4,
            max_blur: 4.0,
            blur_ramp_rate: 0.25,
            blur_scale: 1.0,
            clear_colour: Colour::SKY,
            camera: CameraConfig::default(),
            environment: EnvironmentConfig::default(),
        }
    }
}

impl ScreenConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: ScreenConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.blur_scale > 0.0,
            "blur_scale must be positive, got {}",
            self.blur_scale
        );
        ensure!(self.max_blur >= 0.0, "max_blur must not be negative");
        ensure!(self.blur_ramp_rate >= 0.0, "blur_ramp_rate must not be negative");
        let camera = &self.camera;
        if camera.near <= 0.0 || camera.near >= camera.far {
            bail!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                camera.near,
                camera.far
            );
        }
        ensure!(
            camera.fov_y_degrees > 0.0 && camera.fov_y_degrees < 180.0,
            "fov_y_degrees must be in (0, 180)"
        );
        ensure!(camera.velocity > 0.0, "camera velocity must be positive");
        ensure!(camera.position != camera.target, "camera position equals its target");
        Ok(())
    }

    /// Explicit `asset_dir`, else `assets/` beside the executable, else the
    /// crate's own `assets/` recorded at build time.
    pub fn asset_root(&self) -> PathBuf {
        if let Some(dir) = &self.asset_dir {
            return dir.clone();
        }
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("assets")))
            .filter(|dir| dir.is_dir());
        if let Some(dir) = beside_exe {
            return dir;
        }
        match option_env!("PAUSE_BLUR_ASSETS") {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from("assets"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_the_demo_scene() {
        let config = ScreenConfig::default();
        assert_eq!(config.ping_pong_count, 4);
        assert_eq!(config.max_blur, 4.0);
        assert_eq!(config.blur_ramp_rate, 0.25);
        assert_eq!(config.camera.position, [20.0, 10.0, 20.0]);
        assert_eq!(config.camera.fov_y_degrees, 67.0);
        assert_eq!(config.clear_colour, Colour::SKY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "ping_pong_count": 2, "camera": {{ "velocity": 9.0 }} }}"#).unwrap();
        let config = ScreenConfig::load(file.path()).unwrap();
        assert_eq!(config.ping_pong_count, 2);
        assert_eq!(config.camera.velocity, 9.0);
        assert_eq!(config.camera.near, 0.05);
        assert_eq!(config.model, "models/Low poly House.obj");
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let mut config = ScreenConfig::default();
        config.camera.near = 60.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_blur_scale() {
        let config = ScreenConfig {
            blur_scale: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_asset_dir_wins() {
        let config = ScreenConfig {
            asset_dir: Some(PathBuf::from("/tmp/somewhere")),
            ..Default::default()
        };
        assert_eq!(config.asset_root(), PathBuf::from("/tmp/somewhere"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ScreenConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(format!("{err:#}").contains("reading config"));
    }
}
