use crate::error::{FieldOpsError, Result};
use crate::models::UserProfile;
use dialoguer::{Confirm, Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub sensors: SensorConfig,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorConfig {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_refresh_interval_secs() -> u64 {
    5
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl SensorConfig {
    /// Refresh interval, never shorter than one second.
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(FieldOpsError::Config(format!(
                "Config file not found at {:?}. Run `fieldops init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| FieldOpsError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&config_str)
    }

    fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;
        serde_yaml::from_str(&content)
            .map_err(|e| FieldOpsError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let default_path = Self::default_config_path()?;
        Ok(default_path)
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/fieldops/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FieldOpsError::Config("Cannot determine config directory".into()))?
            .join("fieldops");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("No configuration found. Let's set up FieldOps!");
        println!();

        println!("Farm API");
        let url: String = Input::new()
            .with_prompt("  URL")
            .default("http://localhost:8000".into())
            .interact_text()
            .map_err(input_error)?;

        let token: String = Password::new()
            .with_prompt("  Token (blank for none)")
            .allow_empty_password(true)
            .interact()
            .map_err(input_error)?;

        let timeout_secs: u64 = Input::new()
            .with_prompt("  Request timeout (seconds)")
            .default(default_timeout_secs())
            .interact_text()
            .map_err(input_error)?;

        println!();

        println!("Sensors");
        let refresh_interval_secs: u64 = Input::new()
            .with_prompt("  Refresh interval (seconds)")
            .default(default_refresh_interval_secs())
            .interact_text()
            .map_err(input_error)?;

        println!();

        let profile = if Confirm::new()
            .with_prompt("Add a signed-in profile?")
            .default(false)
            .interact()
            .map_err(input_error)?
        {
            let email: String = Input::new()
                .with_prompt("  Email")
                .interact_text()
                .map_err(input_error)?;
            let user_id: String = Input::new()
                .with_prompt("  User ID")
                .default(email.clone())
                .interact_text()
                .map_err(input_error)?;
            Some(UserProfile {
                user_id,
                email,
                photo_url: None,
            })
        } else {
            None
        };

        println!();

        let config = Config {
            api: ApiConfig {
                url,
                token,
                timeout_secs,
                enabled: true,
            },
            sensors: SensorConfig {
                refresh_interval_secs,
            },
            profile,
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| FieldOpsError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# FieldOps Configuration\n# Generated by `fieldops init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    /// Replace `${VAR}` with the variable's value. Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| FieldOpsError::Config(format!("Invalid substitution pattern: {}", e)))?;

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("FIELDOPS_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| FieldOpsError::Config("Cannot determine data directory".into()))?
            .join("fieldops");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("fieldops.db"))
    }

    pub fn log_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("fieldops.log"))
    }
}

fn input_error(e: dialoguer::Error) -> FieldOpsError {
    FieldOpsError::Config(format!("Input error: {}", e))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                url: "http://localhost:8000".into(),
                token: String::new(),
                timeout_secs: default_timeout_secs(),
                enabled: true,
            },
            sensors: SensorConfig::default(),
            profile: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = Config::parse("api:\n  url: http://farm.local\n").unwrap();
        assert_eq!(config.api.url, "http://farm.local");
        assert_eq!(config.api.timeout_secs, 10);
        assert!(config.api.enabled);
        assert!(config.api.token.is_empty());
        assert_eq!(config.sensors.refresh_interval_secs, 5);
        assert!(config.profile.is_none());
    }

    #[test]
    fn parses_profile_section() {
        let yaml = "\
api:
  url: http://farm.local
  enabled: false
profile:
  user_id: u-1
  email: asha@example.com
";
        let config = Config::parse(yaml).unwrap();
        assert!(!config.api.enabled);
        let profile = config.profile.unwrap();
        assert_eq!(profile.display_name(), "asha");
        assert!(profile.photo_url.is_none());
    }

    #[test]
    fn substitutes_env_vars() {
        std::env::set_var("FIELDOPS_TEST_TOKEN_SUB", "secret-token");
        let input = "token: ${FIELDOPS_TEST_TOKEN_SUB}\nother: ${FIELDOPS_UNSET_VAR_XYZ}";
        let out = Config::substitute_env_vars(input).unwrap();
        assert_eq!(out, "token: secret-token\nother: ${FIELDOPS_UNSET_VAR_XYZ}");
    }

    #[test]
    fn debug_redacts_token() {
        let mut config = Config::default();
        config.api.token = "super-secret".into();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn refresh_interval_has_a_floor() {
        let sensors = SensorConfig {
            refresh_interval_secs: 0,
        };
        assert_eq!(sensors.refresh_interval(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = Config::load(Some(PathBuf::from("/nonexistent/fieldops.yaml")));
        assert!(matches!(result, Err(FieldOpsError::Config(_))));
    }
}
