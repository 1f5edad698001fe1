// config.rs — tunable constants for the walkthrough
//
// Every section is optional in the JSON file; missing fields keep their defaults.
//
// Config selection:
// - CLI: --config <path>
// - Env: WALKTHROUGH_CONFIG
// - <exe_dir>/assets/walkthrough.json, then ./assets/walkthrough.json
// - Otherwise built-in defaults

use crate::error::{Result, WalkthroughError};
use serde::Deserialize;
use std::f32::consts::PI;
use std::path::{Path, PathBuf};

/// Keeps `tan(fov / 2)` finite and positive.
const FOV_MARGIN: f32 = 1e-3;
const MIN_TRANSITION_END: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Elevation while top-down (radians from straight down).
    pub ortho_beta: f32,
    pub perspective_beta: f32,
    /// Narrow FOV that makes the top-down view read as orthographic.
    pub ortho_fov: f32,
    pub perspective_fov: f32,
    /// `radius * tan(fov / 2)`, held fixed so the model keeps its apparent size.
    pub apparent_size: f32,
    /// Per-frame exponential smoothing factor.
    pub smoothing: f32,
    /// Scroll progress at which the transition to perspective completes.
    pub transition_end: f32,
    /// Transition progress below which the view counts as orthographic.
    pub ortho_threshold: f32,
    pub idle_timeout_ms: u64,
    /// Radians added to the azimuth per frame while idling.
    pub idle_speed: f32,
    pub near_min: f32,
    pub near_fraction: f32,
    pub initial_alpha: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            ortho_beta: 0.01,
            perspective_beta: 1.0,
            ortho_fov: 0.06,
            perspective_fov: 0.9,
            apparent_size: 6.0,
            smoothing: 0.08,
            transition_end: 0.33,
            ortho_threshold: 0.1,
            idle_timeout_ms: 5000,
            idle_speed: 0.0015,
            near_min: 0.1,
            near_fraction: 0.01,
            initial_alpha: -std::f32::consts::FRAC_PI_2,
        }
    }
}

impl CameraConfig {
    /// Clamps values that would break the camera math; non-finite values revert to defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fields: [(&str, &mut f32, f32); 11] = [
            ("ortho_beta", &mut self.ortho_beta, defaults.ortho_beta),
            ("perspective_beta", &mut self.perspective_beta, defaults.perspective_beta),
            ("ortho_fov", &mut self.ortho_fov, defaults.ortho_fov),
            ("perspective_fov", &mut self.perspective_fov, defaults.perspective_fov),
            ("apparent_size", &mut self.apparent_size, defaults.apparent_size),
            ("smoothing", &mut self.smoothing, defaults.smoothing),
            ("transition_end", &mut self.transition_end, defaults.transition_end),
            ("ortho_threshold", &mut self.ortho_threshold, defaults.ortho_threshold),
            ("idle_speed", &mut self.idle_speed, defaults.idle_speed),
            ("near_min", &mut self.near_min, defaults.near_min),
            ("near_fraction", &mut self.near_fraction, defaults.near_fraction),
        ];
        for (name, value, default) in fields {
            if !value.is_finite() {
                log::warn!("camera.{name} is not finite; using {default}");
                *value = default;
            }
        }
        if !self.initial_alpha.is_finite() {
            log::warn!("camera.initial_alpha is not finite; using default");
            self.initial_alpha = defaults.initial_alpha;
        }

        for (name, fov) in [
            ("ortho_fov", &mut self.ortho_fov),
            ("perspective_fov", &mut self.perspective_fov),
        ] {
            let clamped = fov.clamp(FOV_MARGIN, PI - FOV_MARGIN);
            if clamped != *fov {
                log::warn!("camera.{name} {fov} out of (0, π); clamped to {clamped}");
                *fov = clamped;
            }
        }

        if self.smoothing <= 0.0 {
            log::warn!("camera.smoothing must be positive; using {}", defaults.smoothing);
            self.smoothing = defaults.smoothing;
        } else if self.smoothing > 1.0 {
            log::warn!("camera.smoothing {} above 1; clamped", self.smoothing);
            self.smoothing = 1.0;
        }

        if self.transition_end < MIN_TRANSITION_END {
            log::warn!(
                "camera.transition_end {} too small; clamped to {MIN_TRANSITION_END}",
                self.transition_end
            );
            self.transition_end = MIN_TRANSITION_END;
        }

        if self.apparent_size <= 0.0 {
            log::warn!("camera.apparent_size must be positive; using {}", defaults.apparent_size);
            self.apparent_size = defaults.apparent_size;
        }
        if self.near_min <= 0.0 {
            log::warn!("camera.near_min must be positive; using {}", defaults.near_min);
            self.near_min = defaults.near_min;
        }

        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub sun_start: f32,
    pub sun_span: f32,
    pub shrink_start: f32,
    pub shrink_span: f32,
    /// Scale multiplier reached at full shrink.
    pub shrink_floor: f32,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            sun_start: 0.66,
            sun_span: 0.05,
            shrink_start: 0.66,
            shrink_span: 0.05,
            shrink_floor: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmissionConfig {
    pub accent_color: [f32; 3],
    pub accent_2_color: [f32; 3],
    pub neutral_color: [f32; 3],
    pub time_samples: usize,
    pub initial_time_index: usize,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            accent_color: [1.0, 0.55, 0.2],
            accent_2_color: [0.25, 0.6, 1.0],
            neutral_color: [1.0, 1.0, 1.0],
            time_samples: 40,
            initial_time_index: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub offset_px: [f32; 2],
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            offset_px: [0.0, -40.0],
        }
    }
}

/// Name conventions the model adapter matches against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NameConfig {
    pub accent_material: String,
    pub accent_2_material: String,
    pub white_material: String,
    pub wall_marker: String,
    pub north: String,
    pub south: String,
    pub east: String,
    pub west: String,
    pub entrance_high: String,
    pub entrance_low: String,
    pub base: String,
    pub furniture_prefixes: [String; 3],
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            accent_material: "Accent".into(),
            accent_2_material: "Accent_2".into(),
            white_material: "White".into(),
            wall_marker: "Wall_Top".into(),
            north: "north".into(),
            south: "south".into(),
            east: "east".into(),
            west: "west".into(),
            entrance_high: "Entrance_High".into(),
            entrance_low: "Entrance_Low".into(),
            base: "Base".into(),
            furniture_prefixes: [
                "Furniture_1".into(),
                "Furniture_2".into(),
                "Furniture_3".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Height of the virtual page the wheel scrolls through.
    pub height_px: f32,
    pub wheel_line_px: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            height_px: 6000.0,
            wheel_line_px: 60.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WalkthroughConfig {
    pub camera: CameraConfig,
    pub sections: SectionConfig,
    pub emission: EmissionConfig,
    pub marker: MarkerConfig,
    pub names: NameConfig,
    pub page: PageConfig,
}

impl WalkthroughConfig {
    pub fn from_json(text: &str, path: &Path) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|source| WalkthroughError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.sanitized())
    }

    pub fn sanitized(mut self) -> Self {
        self.camera = self.camera.sanitized();
        self
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| WalkthroughError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Resolves the config from CLI/env/asset locations, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = resolve_config_path() else {
            log::info!("No walkthrough config found, using defaults");
            return Self::default();
        };

        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded walkthrough config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    let mut it = std::env::args();
    while let Some(a) = it.next() {
        if a == "--config" {
            if let Some(v) = it.next() {
                return Some(PathBuf::from(v));
            }
        }
    }

    if let Ok(v) = std::env::var("WALKTHROUGH_CONFIG") {
        if !v.trim().is_empty() {
            return Some(PathBuf::from(v));
        }
    }

    find_asset("walkthrough.json")
}

/// Looks for `assets/<name>` next to the executable, then in the working dir.
pub fn find_asset(name: &str) -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("assets").join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("assets").join(name);
    if p.exists() {
        return Some(p);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let text = r#"{ "camera": { "idle_timeout_ms": 1200 }, "sections": { "sun_start": 0.5 } }"#;
        let config = WalkthroughConfig::from_json(text, Path::new("inline.json")).unwrap();
        assert_eq!(config.camera.idle_timeout_ms, 1200);
        assert_eq!(config.camera.transition_end, 0.33);
        assert_eq!(config.sections.sun_start, 0.5);
        assert_eq!(config.sections.sun_span, 0.05);
        assert_eq!(config.names, NameConfig::default());
    }

    #[test]
    fn test_bad_json_reports_path() {
        let err = WalkthroughConfig::from_json("{ nope", Path::new("broken.json")).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = WalkthroughConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, WalkthroughError::Io { .. }));
    }

    #[test]
    fn test_degenerate_camera_values_are_clamped() {
        let text = r#"{ "camera": { "ortho_fov": 0.0, "perspective_fov": 3.5, "smoothing": 0.0, "transition_end": -1.0 } }"#;
        let config = WalkthroughConfig::from_json(text, Path::new("bad.json")).unwrap();
        let camera = &config.camera;
        for fov in [camera.ortho_fov, camera.perspective_fov] {
            assert!(fov > 0.0 && fov < std::f32::consts::PI);
            assert!((fov * 0.5).tan().is_finite());
        }
        assert!(camera.smoothing > 0.0 && camera.smoothing <= 1.0);
        assert!(camera.transition_end > 0.0);
    }

    #[test]
    fn test_oversized_smoothing_clamped_to_one() {
        let text = r#"{ "camera": { "smoothing": 4.0 } }"#;
        let config = WalkthroughConfig::from_json(text, Path::new("bad.json")).unwrap();
        assert_eq!(config.camera.smoothing, 1.0);
    }

    #[test]
    fn test_valid_camera_values_untouched() {
        assert_eq!(CameraConfig::default().sanitized(), CameraConfig::default());
    }

    #[test]
    fn test_default_fovs_keep_tan_finite() {
        let camera = CameraConfig::default();
        for fov in [camera.ortho_fov, camera.perspective_fov] {
            assert!(fov > 0.0 && fov < std::f32::consts::PI);
        }
    }
}
