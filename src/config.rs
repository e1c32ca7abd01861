use crate::capture::RawFrameLayout;
use crate::params::{validate_grid_size, DEFAULT_GRID_SIZE};
use anyhow::{bail, Context, Result};
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_FILE_ENV: &str = "EYEDROP_CONFIG_FILE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Off,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    /// How often the cursor is polled and the view redrawn, in Hz.
    refresh_frequency: Option<u32>,
    /// Re-capture the grid every N refreshes.
    capture_ratio: Option<u32>,
    /// Pixels moved per key press while Shift is held.
    fast_step: Option<u32>,
    /// Grid size used when the caller does not pass one.
    grid_size: Option<usize>,
    /// Screenshot to pick from. PPM (P6) files are detected automatically.
    #[serde(skip_serializing_if = "Option::is_none")]
    capture_file: Option<String>,
    /// Layout of `capture_file` when it is a raw 32-bit dump.
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_frame: Option<RawFrameLayout>,
    log_level: Option<LogLevel>,
}

impl RawSettings {
    pub fn schema() -> Result<String> {
        Ok(serde_json::to_string_pretty(&schema_for!(Self))?)
    }

    /// The built-in defaults written out as YAML, for seeding a new config file.
    pub fn default_yaml() -> Result<String> {
        let defaults = Settings::default();
        let raw = RawSettings {
            refresh_frequency: Some(defaults.refresh_frequency),
            capture_ratio: Some(defaults.capture_ratio),
            fast_step: Some(defaults.fast_step),
            grid_size: Some(defaults.grid_size),
            capture_file: None,
            raw_frame: None,
            log_level: Some(defaults.log_level),
        };
        Ok(serde_yaml::to_string(&raw)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub refresh_frequency: u32,
    pub capture_ratio: u32,
    pub fast_step: u32,
    pub grid_size: usize,
    pub capture_file: Option<PathBuf>,
    pub raw_frame: Option<RawFrameLayout>,
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_frequency: 144,
            capture_ratio: 1,
            fast_step: 10,
            grid_size: DEFAULT_GRID_SIZE,
            capture_file: None,
            raw_frame: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_secs(1) / self.refresh_frequency.max(1)
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = anyhow::Error;

    fn try_from(raw: RawSettings) -> Result<Self> {
        let defaults = Settings::default();

        let refresh_frequency = raw.refresh_frequency.unwrap_or(defaults.refresh_frequency);
        if refresh_frequency == 0 {
            bail!("refresh_frequency must be at least 1");
        }
        let capture_ratio = raw.capture_ratio.unwrap_or(defaults.capture_ratio);
        if capture_ratio == 0 {
            bail!("capture_ratio must be at least 1");
        }
        let grid_size = raw.grid_size.unwrap_or(defaults.grid_size);
        validate_grid_size(grid_size)?;

        // the capture file is the only path that needs shell expansion
        let capture_file = raw
            .capture_file
            .map(|path| PathBuf::from(shellexpand::tilde(&path).to_string()));

        Ok(Settings {
            refresh_frequency,
            capture_ratio,
            fast_step: raw.fast_step.unwrap_or(defaults.fast_step),
            grid_size,
            capture_file,
            raw_frame: raw.raw_frame,
            log_level: raw.log_level.unwrap_or(defaults.log_level),
        })
    }
}

impl TryFrom<&PathBuf> for RawSettings {
    type Error = anyhow::Error;

    fn try_from(path: &PathBuf) -> Result<Self> {
        let config = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from path: {path:#?}"))?;
        let raw_config =
            RawSettings::from_str(&config).with_context(|| "Failed to parse eyedrop config file.")?;
        Ok(raw_config)
    }
}

impl FromStr for RawSettings {
    type Err = anyhow::Error;

    fn from_str(config: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(config, config::FileFormat::Yaml))
            .build()
            .with_context(|| "Failed to build configuration.")?;

        let raw_config = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize eyedrop config.")?;
        Ok(raw_config)
    }
}

impl Settings {
    /// Path of the settings file, if one exists.
    pub fn config_path() -> Result<Option<PathBuf>> {
        let config_file_name = format!("{}.yaml", clap::crate_name!());
        match std::env::var_os(CONFIG_FILE_ENV) {
            // if EYEDROP_CONFIG_FILE is set, read from there no questions asked
            Some(config_file_path) => Ok(Some(PathBuf::from(config_file_path))),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix(clap::crate_name!())
                    .with_context(|| "Failed to load XDG dirs.")?;
                Ok(xdg_dirs.find_config_file(config_file_name))
            }
        }
    }

    pub fn load() -> Result<Self> {
        let raw_config = match Self::config_path()? {
            Some(path) => RawSettings::try_from(&path),
            None => RawSettings::from_str(""),
        }?;
        let config = Settings::try_from(raw_config)
            .with_context(|| "Failed to validate configuration settings.")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::capture::PixelFormat;
    use serial_test::serial;

    #[test]
    fn test_empty_config_is_valid() {
        let raw_config = RawSettings::from_str("").unwrap();
        let settings = Settings::try_from(raw_config).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_full_config() {
        let raw_config = RawSettings::from_str(
            r#"
refresh_frequency: 60
capture_ratio: 3
fast_step: 4
grid_size: 9
capture_file: /tmp/screen.bgra
log_level: debug
raw_frame:
  width: 1920
  height: 1080
  stride: 7680
  format: bgra32
"#,
        )
        .unwrap();
        let settings = Settings::try_from(raw_config).unwrap();

        assert_eq!(settings.refresh_frequency, 60);
        assert_eq!(settings.capture_ratio, 3);
        assert_eq!(settings.fast_step, 4);
        assert_eq!(settings.grid_size, 9);
        assert_eq!(settings.capture_file, Some(PathBuf::from("/tmp/screen.bgra")));
        assert_eq!(settings.log_level, LogLevel::Debug);
        let raw = settings.raw_frame.unwrap();
        assert_eq!((raw.width, raw.height, raw.stride()), (1920, 1080, 7680));
        assert_eq!(raw.offset, 0);
        assert_eq!(raw.format, PixelFormat::Bgra32);
    }

    #[test]
    fn test_rejects_invalid_values() {
        for bad in ["refresh_frequency: 0", "capture_ratio: 0", "grid_size: 4"] {
            let raw_config = RawSettings::from_str(bad).unwrap();
            assert!(Settings::try_from(raw_config).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(RawSettings::from_str("search_paths: [\"~\"]").is_err());
    }

    #[test]
    fn test_default_yaml_round_trips_to_defaults() {
        let yaml = RawSettings::default_yaml().unwrap();
        assert!(yaml.contains("refresh_frequency: 144"));
        let settings = Settings::try_from(RawSettings::from_str(&yaml).unwrap()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_tick_rate() {
        let settings = Settings {
            refresh_frequency: 100,
            ..Settings::default()
        };
        assert_eq!(settings.tick_rate(), Duration::from_millis(10));
    }

    #[test]
    #[serial]
    fn test_load_from_env_path() {
        let path = std::env::temp_dir().join(format!("eyedrop-test-{}.yaml", std::process::id()));
        fs::write(&path, "fast_step: 25\n").unwrap();
        unsafe { std::env::set_var(CONFIG_FILE_ENV, &path) };

        let settings = Settings::load();

        unsafe { std::env::remove_var(CONFIG_FILE_ENV) };
        fs::remove_file(&path).unwrap();
        assert_eq!(settings.unwrap().fast_step, 25);
    }

    #[test]
    #[serial]
    fn test_load_fails_on_missing_env_path() {
        unsafe { std::env::set_var(CONFIG_FILE_ENV, "/nonexistent/eyedrop.yaml") };
        let settings = Settings::load();
        unsafe { std::env::remove_var(CONFIG_FILE_ENV) };
        assert!(settings.is_err());
    }
}
