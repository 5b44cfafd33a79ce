//! Widget configuration.
//!
//! Defaults reproduce the stock widgets. With the `serde_json` feature a host
//! page can pass a JSON object to `start_*_with_config`; missing fields fall
//! back to the defaults.

use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[cfg(feature = "serde_json")]
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("floor range {min}..={max} is empty")]
    EmptyFloorRange { min: i32, max: i32 },
    #[error("start floor {floor} is outside {min}..={max}")]
    StartFloorOutOfRange { floor: i32, min: i32, max: i32 },
    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),
}

impl From<ConfigError> for JsValue {
    fn from(err: ConfigError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Elevator geometry and timing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct ElevatorConfig {
    pub min_floor: i32,
    pub max_floor: i32,
    pub start_floor: i32,
    /// Travel time for one floor of distance.
    pub ms_per_floor: u32,
    /// Scroll animation period.
    pub tick_ms: u32,
    /// Background pixels moved per tick (sign comes from the direction).
    pub scroll_step: i64,
    /// Height of one repeating background section.
    pub scroll_period_px: i64,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        Self {
            min_floor: 1,
            max_floor: 10,
            start_floor: 1,
            ms_per_floor: 2000,
            tick_ms: 20,
            scroll_step: 3,
            scroll_period_px: 1000,
        }
    }
}

impl ElevatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_floor >= self.max_floor {
            return Err(ConfigError::EmptyFloorRange {
                min: self.min_floor,
                max: self.max_floor,
            });
        }
        if !(self.min_floor..=self.max_floor).contains(&self.start_floor) {
            return Err(ConfigError::StartFloorOutOfRange {
                floor: self.start_floor,
                min: self.min_floor,
                max: self.max_floor,
            });
        }
        if self.ms_per_floor == 0 {
            return Err(ConfigError::Zero("ms_per_floor"));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Zero("tick_ms"));
        }
        if self.scroll_period_px <= 0 {
            return Err(ConfigError::Zero("scroll_period_px"));
        }
        Ok(())
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Altitude gain curve and animation windows.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct AltitudeConfig {
    pub base_gain: u64,
    pub gain_per_level: u64,
    /// Width of the random part of a gain; the roll adds `[0, gain_jitter)`.
    pub gain_jitter: u64,
    /// How long the character flies before the result is shown.
    pub flight_ms: u32,
    /// How long an achievement popup stays up.
    pub popup_ms: u32,
}

impl Default for AltitudeConfig {
    fn default() -> Self {
        Self {
            base_gain: 100,
            gain_per_level: 50,
            gain_jitter: 200,
            flight_ms: 3000,
            popup_ms: 3000,
        }
    }
}

impl AltitudeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gain_jitter == 0 {
            return Err(ConfigError::Zero("gain_jitter"));
        }
        if self.flight_ms == 0 {
            return Err(ConfigError::Zero("flight_ms"));
        }
        if self.popup_ms == 0 {
            return Err(ConfigError::Zero("popup_ms"));
        }
        Ok(())
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
