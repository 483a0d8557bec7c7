use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("target radius {radius} does not fit a {width}x{height} play area")]
    DegenerateSpawnArea {
        radius: u32,
        width: u32,
        height: u32,
    },
    #[error("walker path (semi-axis {semi_axis}) does not fit a {width}x{height} play area")]
    WalkerPathTooLarge {
        semi_axis: u32,
        width: u32,
        height: u32,
    },
    #[error("display fps must be nonzero")]
    ZeroFps,
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { field: &'static str, value: f32 },
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub gameplay: GameplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Path to the pose estimation ONNX model.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    #[serde(default = "default_camera_index")]
    pub camera_index: u32,
    #[serde(default = "default_window_title")]
    pub window_title: String,
    /// Mirror the camera image so the player sees themselves as in a mirror.
    #[serde(default = "default_flip_image")]
    pub flip_image: bool,
    /// Joints below this confidence are treated as absent.
    #[serde(default = "default_detection_threshold")]
    pub detection_threshold: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BenchmarkConfig {
    /// Measure the camera's effective frame rate at startup.
    #[serde(default = "default_benchmark_enabled")]
    pub enabled: bool,
    #[serde(default = "default_benchmark_frames")]
    pub frame_count: u32,
    /// Render pacing when benchmarking is disabled or fails.
    #[serde(default = "default_fps")]
    pub default_fps: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GameplayConfig {
    /// Hit radius of every target, in pixels.
    #[serde(default = "default_circle_radius")]
    pub circle_radius: u32,
    /// Spawn foot circles in addition to hand circles.
    #[serde(default = "default_foot_circles")]
    pub foot_circles_enabled: bool,
    /// Classic: wall-clock seconds a target lives before forced expiry.
    #[serde(default = "default_life_time")]
    pub classic_life_time_secs: f32,
    /// Classic: removals before the round is lost.
    #[serde(default = "default_classic_max_items")]
    pub classic_max_items: u32,
    /// Intensive aim: seconds between spawn attempts.
    #[serde(default = "default_intensive_interval")]
    pub intensive_interval_secs: f32,
    /// Intensive aim: live targets on screen that lose the round.
    #[serde(default = "default_intensive_max_items")]
    pub intensive_max_items: u32,
    #[serde(default = "default_pursuer_speed")]
    pub pursuer_speed: u32,
    #[serde(default = "default_pursuer_max_progress")]
    pub pursuer_max_progress: u32,
    #[serde(default = "default_walker_speed")]
    pub walker_speed: u32,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/movenet-multipose.onnx")
}
fn default_camera_index() -> u32 {
    0
}
fn default_window_title() -> String {
    "Pose Arcade".to_string()
}
fn default_flip_image() -> bool {
    true
}
fn default_detection_threshold() -> f32 {
    0.2
}
fn default_benchmark_enabled() -> bool {
    true
}
fn default_benchmark_frames() -> u32 {
    80
}
fn default_fps() -> u32 {
    24
}
fn default_circle_radius() -> u32 {
    44
}
fn default_foot_circles() -> bool {
    true
}
fn default_life_time() -> f32 {
    2.0
}
fn default_classic_max_items() -> u32 {
    20
}
fn default_intensive_interval() -> f32 {
    3.0
}
fn default_intensive_max_items() -> u32 {
    4
}
fn default_pursuer_speed() -> u32 {
    5
}
fn default_pursuer_max_progress() -> u32 {
    300
}
fn default_walker_speed() -> u32 {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            model_path: default_model_path(),
            camera_index: default_camera_index(),
            window_title: default_window_title(),
            flip_image: default_flip_image(),
            detection_threshold: default_detection_threshold(),
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            enabled: default_benchmark_enabled(),
            frame_count: default_benchmark_frames(),
            default_fps: default_fps(),
        }
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        GameplayConfig {
            circle_radius: default_circle_radius(),
            foot_circles_enabled: default_foot_circles(),
            classic_life_time_secs: default_life_time(),
            classic_max_items: default_classic_max_items(),
            intensive_interval_secs: default_intensive_interval(),
            intensive_max_items: default_intensive_max_items(),
            pursuer_speed: default_pursuer_speed(),
            pursuer_max_progress: default_pursuer_max_progress(),
            walker_speed: default_walker_speed(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig::default(),
            benchmark: BenchmarkConfig::default(),
            gameplay: GameplayConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Geometry and pacing checks that must hold before a round constructs.
    /// `width`/`height` are the dimensions of one player's area.
    pub fn validate_for_area(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        let radius = self.gameplay.circle_radius;
        if 2 * radius >= width || 2 * radius >= height {
            return Err(ConfigError::DegenerateSpawnArea {
                radius,
                width,
                height,
            });
        }
        // The walker sweeps 2a horizontally and b vertically on top of its radius.
        let semi_axis = width / 8;
        if radius + 2 * semi_axis >= width - 2 * semi_axis - radius
            || radius + 2 * (height / 8) >= height - 2 * (height / 8) - radius
        {
            return Err(ConfigError::WalkerPathTooLarge {
                semi_axis,
                width,
                height,
            });
        }
        if self.benchmark.default_fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        // Both fields end up in Duration::from_secs_f32, which panics on
        // negative or non-finite input.
        let timings = [
            ("classic_life_time_secs", self.gameplay.classic_life_time_secs),
            ("intensive_interval_secs", self.gameplay.intensive_interval_secs),
        ];
        for (field, value) in timings {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_on_a_vga_area() {
        let config = Config::default();
        assert!(config.validate_for_area(640, 480).is_ok());
    }

    #[test]
    fn oversized_radius_is_rejected_at_construction() {
        let mut config = Config::default();
        config.gameplay.circle_radius = 300;
        assert!(matches!(
            config.validate_for_area(640, 480),
            Err(ConfigError::DegenerateSpawnArea { .. })
        ));
    }

    #[test]
    fn negative_or_nan_timings_are_rejected_at_construction() {
        let mut config = Config::default();
        config.gameplay.classic_life_time_secs = -1.0;
        assert!(matches!(
            config.validate_for_area(640, 480),
            Err(ConfigError::InvalidDuration { .. })
        ));

        let mut config = Config::default();
        config.gameplay.intensive_interval_secs = f32::NAN;
        assert!(matches!(
            config.validate_for_area(640, 480),
            Err(ConfigError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn half_screen_area_still_validates() {
        // Two-player split halves the width per player.
        let config = Config::default();
        assert!(config.validate_for_area(320, 480).is_ok());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: Config = toml::from_str(
            "[gameplay]\ncircle_radius = 30\n",
        )
        .unwrap();
        assert_eq!(config.gameplay.circle_radius, 30);
        assert_eq!(config.gameplay.pursuer_max_progress, 300);
        assert!(config.app.flip_image);
    }
}
