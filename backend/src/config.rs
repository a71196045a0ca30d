use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::{error::PepFragError, params::RequestParameters};

pub const CONFIG_FILE: &str = "pepfrag.json";

/// The user configuration, the defaults are written with the same keys as the query.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: serde_json::Map<String, serde_json::Value>,
    /// Where the page is served, used to build share links
    pub origin: Option<String>,
}

/// The location of the configuration file in the platform configuration directory.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "com.snijderlab.pepfrag", "pepfrag")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
    /// Load the configuration, a missing file gives the default configuration.
    /// # Errors
    /// If the file exists but could not be read or parsed.
    pub fn load(path: &Path) -> Result<Self, PepFragError> {
        if !path.exists() {
            log::debug!("No configuration at {}", path.display());
            return Ok(Self::default());
        }
        let file = File::open(path).map_err(|e| PepFragError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| PepFragError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        log::debug!(
            "Loaded {} default(s) from {}",
            config.defaults.len(),
            path.display()
        );
        Ok(config)
    }

    /// Overwrite the parameters with the configured defaults.
    /// # Errors
    /// If a configured value is invalid.
    pub fn apply(&self, parameters: &mut RequestParameters) -> Result<(), PepFragError> {
        for (key, value) in &self.defaults {
            let values = match value {
                serde_json::Value::Array(list) => list.iter().map(json_text).collect(),
                other => vec![json_text(other)],
            };
            parameters.set_values(key, &values.iter().map(String::as_str).collect::<Vec<_>>())?;
        }
        Ok(())
    }
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::fragment::{IonType, MassType};

    #[test]
    fn apply_defaults() {
        let config: Config = serde_json::from_str(indoc! {r##"
            {
                "defaults": {
                    "charge": 3,
                    "fragment_types": ["a", "z"],
                    "mass_type": "average",
                    "show_borders": false,
                    "min_mz": 150.5,
                    "y_color": "#000000",
                    "not_a_parameter": 1
                },
                "origin": "http://localhost:8501"
            }
        "##})
        .unwrap();
        let mut parameters = RequestParameters::default();
        config.apply(&mut parameters).unwrap();
        assert_eq!(parameters.charge, 3);
        assert_eq!(parameters.fragment_types, vec![IonType::a, IonType::z]);
        assert_eq!(parameters.mass_type, MassType::Average);
        assert!(!parameters.show_borders);
        assert!((parameters.min_mz - 150.5).abs() < f64::EPSILON);
        assert_eq!(parameters.colors.get(IonType::y), "#000000");
        assert_eq!(config.origin.as_deref(), Some("http://localhost:8501"));
    }

    #[test]
    fn invalid_default() {
        let config: Config =
            serde_json::from_str(r#"{"defaults": {"decimal_places": 20}}"#).unwrap();
        assert!(matches!(
            config.apply(&mut RequestParameters::default()),
            Err(PepFragError::Parameter { .. })
        ));
    }

    #[test]
    fn files() {
        let missing = std::env::temp_dir().join("pepfrag-missing-config.json");
        assert_eq!(Config::load(&missing).unwrap(), Config::default());

        let broken = std::env::temp_dir().join(format!("pepfrag-broken-{}.json", std::process::id()));
        std::fs::write(&broken, "{ not json").unwrap();
        let error = Config::load(&broken).unwrap_err();
        std::fs::remove_file(&broken).unwrap();
        assert!(matches!(error, PepFragError::Config { ref path, .. } if *path == broken));
    }
}
