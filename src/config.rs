use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use lightsout_sequencer::SequencerConfig;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "lightsout.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sequencer: SequencerConfig,
    pub results_path: PathBuf,
    pub fullscreen: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sequencer: SequencerConfig::default(),
            results_path: PathBuf::from("lightsout_results.json"),
            fullscreen: false,
            window_width: 1280,
            window_height: 720,
        }
    }
}

impl Settings {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("invalid settings file")
    }
}

/// Defaults, then the settings file, then `LIGHTSOUT__*` environment
/// variables. An explicit path must exist; the default one may be absent.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with_default(path, Path::new(DEFAULT_CONFIG_PATH))
}

fn load_settings_with_default(
    path: Option<&Path>,
    default_path: &Path,
) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings '{}'", path.display()))?;
            Settings::from_toml_str(&raw)?
        }
        None => match fs::read_to_string(default_path) {
            Ok(raw) => Settings::from_toml_str(&raw)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read settings '{}'", default_path.display())
                });
            }
        },
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    settings.sequencer.validate()?;
    Ok(settings)
}

fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let parse_ms = |key: &str| -> anyhow::Result<Option<u64>> {
        lookup(key)
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{key} must be a whole number of milliseconds"))
            })
            .transpose()
    };

    if let Some(v) = parse_ms("LIGHTSOUT__STEP_INTERVAL_MS")? {
        settings.sequencer.step_interval_ms = v;
    }
    if let Some(v) = parse_ms("LIGHTSOUT__GO_DARK_MIN_MS")? {
        settings.sequencer.go_dark_range_ms.0 = v;
    }
    if let Some(v) = parse_ms("LIGHTSOUT__GO_DARK_MAX_MS")? {
        settings.sequencer.go_dark_range_ms.1 = v;
    }
    if let Some(v) = lookup("LIGHTSOUT__RESULTS_PATH") {
        settings.results_path = PathBuf::from(v);
    }
    if let Some(v) = lookup("LIGHTSOUT__FULLSCREEN") {
        settings.fullscreen = matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings = Settings::from_toml_str("fullscreen = true").unwrap();
        assert!(settings.fullscreen);
        assert_eq!(settings.sequencer, SequencerConfig::default());
        assert_eq!(settings.window_width, 1280);
    }

    #[test]
    fn parses_sequencer_table() {
        let raw = r#"
            results_path = "out/results.json"

            [sequencer]
            step_interval_ms = 800
            go_dark_range_ms = [500, 1500]
        "#;
        let settings = Settings::from_toml_str(raw).unwrap();
        assert_eq!(settings.sequencer.step_interval_ms, 800);
        assert_eq!(settings.sequencer.go_dark_range_ms, (500, 1500));
        assert_eq!(settings.results_path, PathBuf::from("out/results.json"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Settings::from_toml_str("step_interval_ms = ").is_err());
        assert!(Settings::from_toml_str("[sequencer]\nstep_interval_ms = \"fast\"").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let vars = env(&[
            ("LIGHTSOUT__STEP_INTERVAL_MS", "250"),
            ("LIGHTSOUT__GO_DARK_MAX_MS", "3000"),
            ("LIGHTSOUT__FULLSCREEN", "true"),
        ]);
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |k| vars.get(k).cloned()).unwrap();
        assert_eq!(settings.sequencer.step_interval_ms, 250);
        assert_eq!(settings.sequencer.go_dark_range_ms, (1000, 3000));
        assert!(settings.fullscreen);
    }

    #[test]
    fn non_numeric_env_override_is_rejected() {
        let vars = env(&[("LIGHTSOUT__GO_DARK_MIN_MS", "soon")]);
        let mut settings = Settings::default();
        let err = apply_env_overrides(&mut settings, |k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("LIGHTSOUT__GO_DARK_MIN_MS"));
    }

    #[test]
    fn explicit_path_is_loaded_and_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sequencer]\ngo_dark_range_ms = [2000, 1000]").unwrap();
        assert!(load_settings(Some(file.path())).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sequencer]\nstep_interval_ms = 500").unwrap();
        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.sequencer.step_interval_ms, 500);

        assert!(load_settings(Some(Path::new("/nonexistent/lightsout.toml"))).is_err());
    }

    #[test]
    fn absent_default_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let default_path = dir.path().join(DEFAULT_CONFIG_PATH);
        let settings = load_settings_with_default(None, &default_path).unwrap();
        assert_eq!(settings.sequencer, SequencerConfig::default());
    }

    #[test]
    fn unreadable_default_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let default_path = dir.path().join(DEFAULT_CONFIG_PATH);
        fs::write(&default_path, [0xff, 0xfe, 0x00]).unwrap();

        let err = load_settings_with_default(None, &default_path).unwrap_err();
        assert!(err.to_string().contains("failed to read settings"), "{err:#}");
    }
}
