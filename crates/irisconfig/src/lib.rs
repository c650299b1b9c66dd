use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

pub const CONFIG_VERSION: u32 = 1;

/// Smallest non-zero frame cap accepted in `surface.fps`.
pub const MIN_FPS: f32 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Whether the reduced-motion preference is read from the desktop or forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReducedMotionSetting {
    #[default]
    Auto,
    Reduce,
    NoPreference,
}

impl FromStr for ReducedMotionSetting {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" | "system" => Ok(Self::Auto),
            "reduce" | "reduced" | "on" | "true" => Ok(Self::Reduce),
            "no-preference" | "none" | "off" | "false" => Ok(Self::NoPreference),
            other => Err(format!(
                "invalid reduced-motion setting '{other}'; expected auto, reduce, or no-preference"
            )),
        }
    }
}

/// Whether the lens keeps following the pointer when motion is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerFollowSetting {
    Always,
    #[default]
    WithMotion,
}

impl FromStr for PointerFollowSetting {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "with-motion" | "motion" => Ok(Self::WithMotion),
            other => Err(format!(
                "invalid pointer-follow setting '{other}'; expected always or with-motion"
            )),
        }
    }
}

/// Written back as `"auto"`, `"off"` or the bare sample count so saved files
/// parse again through [`parse_antialias`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    pub fn sample_count(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

impl Serialize for AntialiasSetting {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.sample_count() {
            None => serializer.serialize_str("auto"),
            Some(1) => serializer.serialize_str("off"),
            Some(samples) => serializer.serialize_u32(samples),
        }
    }
}

/// An sRGB colour written as `#rrggbb` in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexColor {
    rgb: [u8; 3],
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { rgb: [r, g, b] }
    }

    /// Channel values scaled into `0.0..=1.0`.
    pub fn to_unit(self) -> [f32; 3] {
        self.rgb.map(|channel| channel as f32 / 255.0)
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| format!("colour '{trimmed}' must start with '#'"))?;
        if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(format!("colour '{trimmed}' must be written as #rrggbb"));
        }
        let channel = |index: usize| {
            u8::from_str_radix(&digits[index..index + 2], 16)
                .map_err(|err| format!("colour '{trimmed}': {err}"))
        };
        Ok(Self {
            rgb: [channel(0)?, channel(2)?, channel(4)?],
        })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.rgb;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl Serialize for HexColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IrisConfig {
    pub version: u32,
    #[serde(default)]
    pub motion: MotionSection,
    #[serde(default)]
    pub palette: PaletteSection,
    #[serde(default)]
    pub surface: SurfaceSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionSection {
    pub reduced: ReducedMotionSetting,
    pub pointer_follow: PointerFollowSetting,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub max_frame_delta: Duration,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaletteSection {
    pub primary: HexColor,
    pub secondary: HexColor,
    pub glint: HexColor,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SurfaceSection {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub transparent: bool,
    pub decorations: bool,
    pub pixel_ratio: [f32; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    #[serde(
        deserialize_with = "deserialize_antialias_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub antialias: Option<AntialiasSetting>,
}

impl Default for IrisConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            motion: MotionSection::default(),
            palette: PaletteSection::default(),
            surface: SurfaceSection::default(),
        }
    }
}

impl Default for MotionSection {
    fn default() -> Self {
        Self {
            reduced: ReducedMotionSetting::default(),
            pointer_follow: PointerFollowSetting::default(),
            max_frame_delta: default_max_frame_delta(),
        }
    }
}

impl Default for PaletteSection {
    fn default() -> Self {
        Self {
            primary: HexColor::new(0x1b, 0x3a, 0x4b),
            secondary: HexColor::new(0x5f, 0xa8, 0xa3),
            glint: HexColor::new(0xf2, 0xe6, 0xc9),
        }
    }
}

impl Default for SurfaceSection {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            fullscreen: false,
            transparent: true,
            decorations: false,
            pixel_ratio: [1.0, 2.0],
            fps: None,
            antialias: None,
        }
    }
}

fn default_max_frame_delta() -> Duration {
    Duration::from_millis(100)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(|d| d.unwrap_or_else(default_max_frame_delta))
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*value))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            let raw = value.to_string();
            Some(parse_antialias(&raw).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

impl IrisConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: IrisConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Frame cap with `0` (or negative) mapped to uncapped.
    pub fn target_fps(&self) -> Option<f32> {
        self.surface
            .fps
            .and_then(|fps| if fps > 0.0 { Some(fps) } else { None })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        if self.motion.max_frame_delta.is_zero() {
            return Err(ConfigError::Invalid(
                "motion.max_frame_delta must be greater than zero".into(),
            ));
        }

        let surface = &self.surface;
        if surface.width == 0 || surface.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "surface size {}x{} must be greater than zero",
                surface.width, surface.height
            )));
        }

        let [min_ratio, max_ratio] = surface.pixel_ratio;
        if !(min_ratio.is_finite() && max_ratio.is_finite()) || min_ratio <= 0.0 {
            return Err(ConfigError::Invalid(
                "surface.pixel_ratio bounds must be finite and greater than zero".into(),
            ));
        }
        if min_ratio > max_ratio {
            return Err(ConfigError::Invalid(format!(
                "surface.pixel_ratio minimum {min_ratio} exceeds maximum {max_ratio}"
            )));
        }

        if let Some(fps) = surface.fps {
            if !fps.is_finite() || fps < 0.0 || (fps > 0.0 && fps < MIN_FPS) {
                return Err(ConfigError::Invalid(format!(
                    "surface.fps must be 0 (uncapped) or at least {MIN_FPS}, got {fps}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
version = 1

[motion]
reduced = "reduce"
pointer_follow = "always"
max_frame_delta = "250ms"

[palette]
primary = "#102030"
secondary = "#A0B0C0"
glint = "#ffffff"

[surface]
width = 800
height = 600
fullscreen = true
transparent = false
pixel_ratio = [1.0, 1.5]
fps = 30
antialias = 4
"##;

    #[test]
    fn parses_sample_config() {
        let config = IrisConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.motion.reduced, ReducedMotionSetting::Reduce);
        assert_eq!(config.motion.pointer_follow, PointerFollowSetting::Always);
        assert_eq!(config.motion.max_frame_delta, Duration::from_millis(250));
        assert_eq!(config.palette.secondary, HexColor::new(0xa0, 0xb0, 0xc0));
        assert_eq!(config.surface.pixel_ratio, [1.0, 1.5]);
        assert_eq!(config.target_fps(), Some(30.0));
        assert_eq!(config.surface.antialias, Some(AntialiasSetting::Samples4));
        assert!(config.surface.fullscreen);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = IrisConfig::from_toml_str("version = 1").unwrap();
        assert_eq!(config, IrisConfig::default());
        assert_eq!(config.target_fps(), None);
    }

    #[test]
    fn zero_fps_treated_as_uncapped() {
        let config = IrisConfig::from_toml_str("version = 1\n[surface]\nfps = 0\n").unwrap();
        assert_eq!(config.target_fps(), None);
    }

    #[test]
    fn rejects_unknown_version() {
        let err = IrisConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_colour() {
        let err = IrisConfig::from_toml_str("version = 1\n[palette]\nprimary = \"teal\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_inverted_pixel_ratio() {
        let err = IrisConfig::from_toml_str("version = 1\n[surface]\npixel_ratio = [2.0, 1.0]\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn default_config_survives_serialization() {
        let rendered = IrisConfig::default().to_toml_string().unwrap();
        assert!(rendered.contains("max_frame_delta = \"100ms\""));
        assert!(rendered.contains("primary = \"#1b3a4b\""));
        let reparsed = IrisConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed, IrisConfig::default());
    }

    #[test]
    fn explicit_antialias_survives_serialization() {
        for setting in [
            AntialiasSetting::Auto,
            AntialiasSetting::Off,
            AntialiasSetting::Samples4,
            AntialiasSetting::Samples16,
        ] {
            let mut config = IrisConfig::default();
            config.surface.antialias = Some(setting);
            let rendered = config.to_toml_string().unwrap();
            let reparsed = IrisConfig::from_toml_str(&rendered).unwrap();
            assert_eq!(reparsed.surface.antialias, Some(setting));
        }

        let mut config = IrisConfig::default();
        config.surface.antialias = Some(AntialiasSetting::Samples4);
        assert!(config.to_toml_string().unwrap().contains("antialias = 4"));
    }

    #[test]
    fn rejects_unusable_fps_caps() {
        for raw in ["1e-30", "0.5", "-3", "inf", "nan"] {
            let input = format!("version = 1\n[surface]\nfps = {raw}\n");
            let err = IrisConfig::from_toml_str(&input).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "fps = {raw}");
        }
        let config = IrisConfig::from_toml_str("version = 1\n[surface]\nfps = 1\n").unwrap();
        assert_eq!(config.target_fps(), Some(1.0));
    }

    #[test]
    fn hex_colour_scales_to_unit_range() {
        let colour: HexColor = "#ff8000".parse().unwrap();
        let [r, g, b] = colour.to_unit();
        assert_eq!(r, 1.0);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 0.0);
        assert!("#ff80".parse::<HexColor>().is_err());
    }

    #[test]
    fn parses_cli_style_motion_settings() {
        assert_eq!(
            "No-Preference".parse::<ReducedMotionSetting>().unwrap(),
            ReducedMotionSetting::NoPreference
        );
        assert_eq!(
            "with-motion".parse::<PointerFollowSetting>().unwrap(),
            PointerFollowSetting::WithMotion
        );
        assert!("sometimes".parse::<PointerFollowSetting>().is_err());
    }
}
