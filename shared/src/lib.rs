use serde::{Deserialize, Serialize};
use thiserror::Error;

// ===== CORE DATA TYPES =====

/// Pixel position of a draggable element relative to its positioned parent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ===== ERRORS =====

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse draggable config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize draggable config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unsupported config version '{0}'")]
    UnsupportedVersion(String),
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

// ===== CONFIG TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DraggableConfig {
    pub app: AppSection,
    pub drag: DragSection,
    pub layout: LayoutSection,
}

impl DraggableConfig {
    /// Parse a TOML document. Missing sections fall back to their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: DraggableConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.app.is_supported_version() {
            return Err(ConfigError::UnsupportedVersion(self.app.version.clone()));
        }
        self.layout.validate()
    }
}

// AppSection carries the config format version; unknown versions are rejected
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSection {
    pub version: String,
}

impl AppSection {
    /// Current configuration format version
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn is_supported_version(&self) -> bool {
        self.version == Self::CURRENT_VERSION
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
        }
    }
}

/// Behaviour of the pointer-drag controller.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DragSection {
    /// Write `left`/`top` into the container style on every move.
    pub auto_update: bool,
    /// Only start drag sessions while the element is active.
    pub require_active: bool,
}

impl Default for DragSection {
    fn default() -> Self {
        Self {
            auto_update: true,
            require_active: false,
        }
    }
}

/// Initial geometry and activation of a draggable/resizable element.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutSection {
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
    pub active: bool,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 200.0,
            x: 0.0,
            y: 0.0,
            active: false,
        }
    }
}

impl LayoutSection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("width", self.width), ("height", self.height), ("x", self.x), ("y", self.y)] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidLayout(format!("{name} must be finite, got {value}")));
            }
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(ConfigError::InvalidLayout(format!(
                "size must not be negative, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}
