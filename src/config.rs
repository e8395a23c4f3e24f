// THEORY:
// `AcquisitionConfig` gathers every fixed input of the acquisition core: region
// size, the manual offset between detected centroid and true target, the target
// color range, cycle pacing, and the auto-move policy. Defaults are the stock
// green-target setup; `from_env` lets a deployment override any of them without a
// rebuild.

use crate::core_modules::color_range::ColorRange;
use crate::core_modules::marker::DEFAULT_MARKER_SIZE;
use crate::core_modules::pixel::pixel::{HUE8_RANGE, Hsv8};
use crate::core_modules::pointer_actuator::InjectionFailurePolicy;
use crate::error::ConfigError;
use std::time::Duration;

pub const ENV_PREFIX: &str = "CHROMA_";

/// Whether the loop moves the pointer toward each valid target, and in how many steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoMovePolicy {
    pub enabled: bool,
    pub steps: i32,
}

impl Default for AutoMovePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            steps: 5,
        }
    }
}

/// Configuration for the acquisition loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionConfig {
    /// Half the side of the capture square, and the maximum accepted centroid distance.
    pub radius: i32,
    /// Added to every located target, in display pixels.
    pub manual_offset: (i32, i32),
    pub color_range: ColorRange,
    /// Pause between acquisition cycles.
    pub cycle_interval: Duration,
    /// Pause between the steps of one smoothed pointer move.
    pub step_interval: Duration,
    pub auto_move: AutoMovePolicy,
    pub failure_policy: InjectionFailurePolicy,
    /// Side of the square the render path draws around a target.
    pub marker_size: f32,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            radius: 500,
            manual_offset: (0, 5),
            color_range: ColorRange::default(),
            cycle_interval: Duration::from_millis(5),
            step_interval: Duration::from_millis(1),
            auto_move: AutoMovePolicy::default(),
            failure_policy: InjectionFailurePolicy::Ignore,
            marker_size: DEFAULT_MARKER_SIZE,
        }
    }
}

impl AcquisitionConfig {
    /// Defaults overridden by `CHROMA_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `CHROMA_*` key.
    ///
    /// Recognized keys: `RADIUS`, `OFFSET_X`, `OFFSET_Y`, `HSV_LOWER`, `HSV_UPPER`
    /// (as `h,s,v`), `CYCLE_MS`, `STEP_MS`, `AUTO_MOVE`, `SMOOTHING`,
    /// `ABORT_ON_INJECTION_FAILURE`, `MARKER_SIZE`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value.trim().to_string()))
        };

        let mut config = Self::default();
        if let Some((key, value)) = get("RADIUS") {
            config.radius = parse_number(&key, &value)?;
        }
        if let Some((key, value)) = get("OFFSET_X") {
            config.manual_offset.0 = parse_number(&key, &value)?;
        }
        if let Some((key, value)) = get("OFFSET_Y") {
            config.manual_offset.1 = parse_number(&key, &value)?;
        }
        if let Some((key, value)) = get("HSV_LOWER") {
            config.color_range.lower = parse_hsv(&key, &value)?;
        }
        if let Some((key, value)) = get("HSV_UPPER") {
            config.color_range.upper = parse_hsv(&key, &value)?;
        }
        if let Some((key, value)) = get("CYCLE_MS") {
            config.cycle_interval = Duration::from_millis(parse_number(&key, &value)?);
        }
        if let Some((key, value)) = get("STEP_MS") {
            config.step_interval = Duration::from_millis(parse_number(&key, &value)?);
        }
        if let Some((key, value)) = get("AUTO_MOVE") {
            config.auto_move.enabled = parse_flag(&key, &value)?;
        }
        if let Some((key, value)) = get("SMOOTHING") {
            config.auto_move.steps = parse_number(&key, &value)?;
        }
        if let Some((key, value)) = get("ABORT_ON_INJECTION_FAILURE") {
            config.failure_policy = if parse_flag(&key, &value)? {
                InjectionFailurePolicy::Abort
            } else {
                InjectionFailurePolicy::Ignore
            };
        }
        if let Some((key, value)) = get("MARKER_SIZE") {
            config.marker_size = parse_number(&key, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radius < 1 {
            return Err(ConfigError::invalid("radius", format!("must be at least 1, got {}", self.radius)));
        }
        if self.color_range.is_empty() {
            return Err(ConfigError::invalid("color_range", "lower bound exceeds upper bound"));
        }
        if self.color_range.upper.hue as i32 >= HUE8_RANGE {
            return Err(ConfigError::invalid(
                "color_range",
                format!("hue must stay below {HUE8_RANGE}, got {}", self.color_range.upper.hue),
            ));
        }
        if !(self.marker_size.is_finite() && self.marker_size > 0.0) {
            return Err(ConfigError::invalid("marker_size", "must be a positive number"));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err: T::Err| ConfigError::invalid(key, format!("{value:?}: {err}")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, format!("{value:?} is not a boolean"))),
    }
}

fn parse_hsv(key: &str, value: &str) -> Result<Hsv8, ConfigError> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [hue, saturation, value_part] = parts.as_slice() else {
        return Err(ConfigError::invalid(key, format!("{value:?} is not h,s,v")));
    };
    Ok(Hsv8::new(
        parse_number(key, hue)?,
        parse_number(key, saturation)?,
        parse_number(key, value_part)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (format!("{ENV_PREFIX}{k}"), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_the_stock_green_setup() {
        let config = AcquisitionConfig::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(config, AcquisitionConfig::default());
        assert_eq!(config.radius, 500);
        assert_eq!(config.manual_offset, (0, 5));
        assert_eq!(config.color_range.lower, Hsv8::new(55, 200, 200));
        assert_eq!(config.color_range.upper, Hsv8::new(70, 255, 255));
        assert_eq!(config.cycle_interval, Duration::from_millis(5));
        assert!(!config.auto_move.enabled);
    }

    #[test]
    fn overrides_are_applied() {
        let config = AcquisitionConfig::from_lookup(lookup(&[
            ("RADIUS", "120"),
            ("OFFSET_X", "-3"),
            ("HSV_LOWER", "0, 100, 100"),
            ("HSV_UPPER", "10,255,255"),
            ("CYCLE_MS", "16"),
            ("AUTO_MOVE", "yes"),
            ("SMOOTHING", "12"),
            ("ABORT_ON_INJECTION_FAILURE", "1"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.radius, 120);
        assert_eq!(config.manual_offset, (-3, 5));
        assert_eq!(config.color_range, ColorRange::new(Hsv8::new(0, 100, 100), Hsv8::new(10, 255, 255)));
        assert_eq!(config.cycle_interval, Duration::from_millis(16));
        assert_eq!(config.auto_move, AutoMovePolicy { enabled: true, steps: 12 });
        assert_eq!(config.failure_policy, InjectionFailurePolicy::Abort);
    }

    #[test]
    fn malformed_values_name_their_key() {
        let err = AcquisitionConfig::from_lookup(lookup(&[("RADIUS", "wide")])).expect_err("not a number");
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "CHROMA_RADIUS"));

        let err = AcquisitionConfig::from_lookup(lookup(&[("HSV_LOWER", "1,2")])).expect_err("two parts");
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "CHROMA_HSV_LOWER"));

        assert!(AcquisitionConfig::from_lookup(lookup(&[("AUTO_MOVE", "maybe")])).is_err());
    }

    #[test]
    fn semantic_validation_rejects_unusable_configs() {
        assert!(AcquisitionConfig::from_lookup(lookup(&[("RADIUS", "0")])).is_err());
        assert!(AcquisitionConfig::from_lookup(lookup(&[("HSV_LOWER", "80,0,0")])).is_err());
        assert!(AcquisitionConfig::from_lookup(lookup(&[("HSV_UPPER", "200,255,255")])).is_err());
    }
}
