use crate::types::{parse_hex_rgb, ClothDims, WindParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a scene configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid color {0:?}: expected #RRGGBB")]
    InvalidColor(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Scene configuration, loadable from a YAML file.
///
/// Every field has a default, so a partial file (or no file at all) yields
/// the canonical five-flag line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Number of flags on the rope.
    pub flag_count: usize,
    /// Per-flag mesh dimensions.
    pub flag: ClothDims,
    /// Horizontal distance between flag centers.
    pub spacing: f32,
    /// Phase offset added per flag index, desynchronizing their motion.
    pub phase_step: f32,
    /// Flag material opacity.
    pub opacity: f32,
    /// Flag palette, cycled by flag index. `#RRGGBB` strings.
    pub colors: Vec<String>,
    /// Rope material color.
    pub rope_color: String,
    /// Window clear color.
    pub clear_color: String,
    /// Wind field parameters.
    pub wind: WindParams,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            flag_count: 5,
            flag: ClothDims::default(),
            spacing: 1.25,
            phase_step: 0.7,
            opacity: 0.92,
            // Traditional order: blue, white, red, green, yellow.
            colors: vec![
                "#2B5797".into(),
                "#E8E4DF".into(),
                "#AA2222".into(),
                "#3A7D44".into(),
                "#D4A827".into(),
            ],
            rope_color: "#8B7355".into(),
            clear_color: "#1A1A26".into(),
            wind: WindParams::default(),
        }
    }
}

impl SceneConfig {
    /// Load a config from a YAML file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and color syntax.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flag_count == 0 {
            return Err(ConfigError::Invalid("flag_count must be at least 1".into()));
        }
        if self.flag.width <= 0.0 || self.flag.height <= 0.0 {
            return Err(ConfigError::Invalid(
                "flag width and height must be positive".into(),
            ));
        }
        if self.flag.cols == 0 || self.flag.rows == 0 {
            return Err(ConfigError::Invalid(
                "flag cols and rows must be nonzero".into(),
            ));
        }
        if self.spacing <= 0.0 {
            return Err(ConfigError::Invalid("spacing must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::Invalid("opacity must be in [0, 1]".into()));
        }
        if self.colors.is_empty() {
            return Err(ConfigError::Invalid("colors must be non-empty".into()));
        }
        for color in self.colors.iter().chain([&self.rope_color, &self.clear_color]) {
            if parse_hex_rgb(color).is_none() {
                return Err(ConfigError::InvalidColor(color.clone()));
            }
        }
        Ok(())
    }

    /// Palette color for flag `index`, cycling through the configured colors.
    pub fn color_for(&self, index: usize) -> [f32; 3] {
        let hex = &self.colors[index % self.colors.len()];
        // Validated at load time; the default palette always parses.
        parse_hex_rgb(hex).unwrap_or([1.0, 1.0, 1.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.flag_count, 5);
        assert_eq!(config.colors.len(), 5);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: SceneConfig = serde_yaml::from_str("flag_count: 3\n").unwrap();
        assert_eq!(config.flag_count, 3);
        assert_eq!(config.spacing, 1.25);
        assert_eq!(config.wind, WindParams::default());
    }

    #[test]
    fn zero_flags_rejected() {
        let config = SceneConfig {
            flag_count: 0,
            ..SceneConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn bad_color_rejected() {
        let config = SceneConfig {
            colors: vec!["#2B5797".into(), "not-a-color".into()],
            ..SceneConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidColor(_))
        ));
    }

    #[test]
    fn palette_cycles() {
        let config = SceneConfig::default();
        assert_eq!(config.color_for(0), config.color_for(5));
        assert_ne!(config.color_for(0), config.color_for(1));
    }

    #[test]
    fn config_yaml_roundtrip() {
        let config = SceneConfig::default();
        let text = serde_yaml::to_string(&config).unwrap();
        let back: SceneConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(config, back);
    }
}
