//! Viewer configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! YAML file, `OVERLAY_*` environment variables, and command-line flags
//! (applied by `main`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use overlay_common::OverlayVisibility;
use overlay_renderer::field::SampleChannel;
use overlay_renderer::remap::DEFAULT_ALPHA_MULTIPLIER;
use overlay_renderer::style::{ContourStyle, ThresholdSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Root viewer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub canvas: CanvasConfig,
    pub frames: FramesConfig,
    pub output: OutputConfig,
    pub fill: FillConfig,
    pub contours: ContourStyle,
    /// JSON contour style that replaces the `contours` section when set
    pub style_file: Option<PathBuf>,
    pub sampling: SampleChannel,
    pub visibility: OverlayVisibility,
}

/// Output canvas dimensions. Mask rasters must match them exactly.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 320,
        }
    }
}

/// Where frame masks come from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FramesConfig {
    /// Resource key of frame `i` is `{key_prefix}{i}`
    pub key_prefix: String,
    /// Directory holding `{key}.png` masks
    pub mask_dir: PathBuf,
    /// First frame index to show
    pub start: u32,
    /// Number of frames to step through
    pub count: u32,
}

impl Default for FramesConfig {
    fn default() -> Self {
        Self {
            key_prefix: "overlay_".to_string(),
            mask_dir: PathBuf::from("masks"),
            start: 0,
            count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory snapshots are written to
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("overlay-output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FillConfig {
    /// Display-time alpha multiplier for the recolored mask
    pub alpha_multiplier: f32,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            alpha_multiplier: DEFAULT_ALPHA_MULTIPLIER,
        }
    }
}

impl ViewerConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse viewer config YAML")
    }

    /// Defaults, then the YAML file if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                info!(path = %path.display(), "Loaded viewer config file");
                Self::from_yaml(&content)
                    .with_context(|| format!("Invalid config file: {:?}", path))?
            }
            None => Self::default(),
        };

        config.apply_env_with(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `OVERLAY_*` overrides obtained through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("OVERLAY_STYLE_FILE") {
            self.style_file = Some(PathBuf::from(v));
        }
        // Individual contour variables below still override the file
        self.load_style_file()?;

        if let Some(v) = lookup("OVERLAY_CANVAS_WIDTH") {
            self.canvas.width = parse_var("OVERLAY_CANVAS_WIDTH", &v)?;
        }
        if let Some(v) = lookup("OVERLAY_CANVAS_HEIGHT") {
            self.canvas.height = parse_var("OVERLAY_CANVAS_HEIGHT", &v)?;
        }
        if let Some(v) = lookup("OVERLAY_KEY_PREFIX") {
            self.frames.key_prefix = v;
        }
        if let Some(v) = lookup("OVERLAY_MASK_DIR") {
            self.frames.mask_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("OVERLAY_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("OVERLAY_ALPHA_MULTIPLIER") {
            self.fill.alpha_multiplier = parse_var("OVERLAY_ALPHA_MULTIPLIER", &v)?;
        }
        if let Some(v) = lookup("OVERLAY_STROKE_WIDTH") {
            self.contours.stroke_width = parse_var("OVERLAY_STROKE_WIDTH", &v)?;
        }
        if let Some(v) = lookup("OVERLAY_SMOOTHING_PASSES") {
            self.contours.smoothing_passes = parse_var("OVERLAY_SMOOTHING_PASSES", &v)?;
        }
        if let Some(v) = lookup("OVERLAY_LEVEL_COUNT") {
            self.contours.thresholds = ThresholdSpec::Count {
                count: parse_var("OVERLAY_LEVEL_COUNT", &v)?,
            };
        }
        if let Some(v) = lookup("OVERLAY_VISIBILITY") {
            self.visibility = parse_var("OVERLAY_VISIBILITY", &v)?;
        }
        if let Some(v) = lookup("OVERLAY_SAMPLE_CHANNEL") {
            self.sampling = match v.trim().to_lowercase().as_str() {
                "red" => SampleChannel::Red,
                "luminance" => SampleChannel::Luminance,
                other => anyhow::bail!("OVERLAY_SAMPLE_CHANNEL: unknown channel '{}'", other),
            };
        }

        debug!(config = ?self, "Applied environment overrides");
        Ok(())
    }

    /// Replace the contour style with the contents of `style_file`, if set.
    pub fn load_style_file(&mut self) -> Result<()> {
        if let Some(path) = &self.style_file {
            self.contours = ContourStyle::from_file(path)
                .with_context(|| format!("Failed to load contour style: {:?}", path))?;
            info!(path = %path.display(), "Loaded contour style file");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.canvas.width > 0 && self.canvas.height > 0,
            "Canvas dimensions must be positive, got {}x{}",
            self.canvas.width,
            self.canvas.height
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.fill.alpha_multiplier),
            "Alpha multiplier must be within [0, 1], got {}",
            self.fill.alpha_multiplier
        );
        anyhow::ensure!(
            !self.frames.key_prefix.is_empty(),
            "Frame key prefix cannot be empty"
        );
        self.contours
            .validate()
            .context("Invalid contour style")?;
        Ok(())
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{}: cannot parse '{}': {}", name, value, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.canvas.width, 320);
        assert_eq!(config.canvas.height, 320);
        assert_eq!(config.frames.key_prefix, "overlay_");
        assert_eq!(config.fill.alpha_multiplier, 0.7);
        assert_eq!(config.contours.stroke_width, 1.2);
        assert_eq!(config.visibility, OverlayVisibility::Fill);
        assert_eq!(config.sampling, SampleChannel::Red);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OVERLAY_CANVAS_WIDTH", "64"),
            ("OVERLAY_KEY_PREFIX", "mask_"),
            ("OVERLAY_VISIBILITY", "contours"),
            ("OVERLAY_LEVEL_COUNT", "4"),
        ]
        .into_iter()
        .collect();

        let mut config = ViewerConfig::default();
        config
            .apply_env_with(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.canvas.width, 64);
        assert_eq!(config.canvas.height, 320);
        assert_eq!(config.frames.key_prefix, "mask_");
        assert_eq!(config.visibility, OverlayVisibility::Contours);
        assert_eq!(config.contours.thresholds, ThresholdSpec::Count { count: 4 });
    }

    #[test]
    fn test_env_parse_error_names_variable() {
        let mut config = ViewerConfig::default();
        let err = config
            .apply_env_with(|name| (name == "OVERLAY_ALPHA_MULTIPLIER").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("OVERLAY_ALPHA_MULTIPLIER"));
    }

    #[test]
    fn test_style_file_replaces_contours() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contours.json");
        std::fs::write(
            &path,
            r#"{ "thresholds": { "mode": "interval", "interval": 0.25 }, "stroke_width": 2.5 }"#,
        )
        .unwrap();

        let vars: HashMap<&str, String> = [
            ("OVERLAY_STYLE_FILE", path.display().to_string()),
            ("OVERLAY_SMOOTHING_PASSES", "3".to_string()),
        ]
        .into_iter()
        .collect();

        let mut config = ViewerConfig::default();
        config.apply_env_with(|name| vars.get(name).cloned()).unwrap();

        assert_eq!(config.style_file.as_deref(), Some(path.as_path()));
        assert_eq!(
            config.contours.thresholds,
            ThresholdSpec::Interval { interval: 0.25 }
        );
        assert_eq!(config.contours.stroke_width, 2.5);
        assert_eq!(config.contours.smoothing_passes, 3);
    }

    #[test]
    fn test_invalid_style_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contours.json");
        std::fs::write(&path, r#"{ "thresholds": { "mode": "count", "count": 100000 } }"#).unwrap();

        let mut config = ViewerConfig {
            style_file: Some(path),
            ..Default::default()
        };
        let err = config.load_style_file().unwrap_err();
        assert!(err.to_string().contains("Failed to load contour style"));
    }

    #[test]
    fn test_style_file_from_yaml() {
        let config = ViewerConfig::from_yaml("style_file: styles/contours.json\n").unwrap();
        assert_eq!(config.style_file, Some(PathBuf::from("styles/contours.json")));
    }

    #[test]
    fn test_validate_rejects_zero_canvas() {
        let mut config = ViewerConfig::default();
        config.canvas.height = 0;
        assert!(config.validate().is_err());
    }
}
