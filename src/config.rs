use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub smtp: SmtpConfig,
    pub log_level: Option<String>,
    #[serde(default)]
    pub quiet: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub starttls: bool,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub debug: bool,
    pub timeout_seconds: Option<u64>,
    /// Default sender, overridable with `--from`.
    pub from: Option<String>,
}

// Implement loading configuration
impl AppConfig {
    // Load config from defaults, then file (if exists), then environment variables
    pub fn new() -> Result<Self, ConfigError> {
        Self::configure_defaults()?
            // Merge in config file if present
            .add_source(File::with_name("config").required(false))
            // Merge in environment variables
            // e.g. MAIL_SMTP__HOST=... MAIL_SMTP__PASSWORD=...
            .add_source(Environment::with_prefix("MAIL").separator("__"))
            .build()?
            .try_deserialize()
    }

    // Load config from a specific file path
    pub fn new_from_file(path: &str) -> Result<Self, ConfigError> {
        Self::configure_defaults()?
            .add_source(File::with_name(path).required(true))
            .add_source(Environment::with_prefix("MAIL").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn configure_defaults()
    -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_valid_config_deserialization() {
        let toml_str = r#"
            log_level = "debug"

            [smtp]
            host = "smtp.example.com"
            port = 587
            username = "sender_user"
            password = "sender_pass"
            starttls = true
            timeout_seconds = 20
            from = "Info <info@example.com>"
        "#;

        let builder = AppConfig::configure_defaults()
            .unwrap()
            .add_source(File::from_str(toml_str, FileFormat::Toml));

        let config: AppConfig = builder.build().unwrap().try_deserialize().unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.smtp.host, "smtp.example.com");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.username.as_deref(), Some("sender_user"));
        assert!(config.smtp.starttls);
        assert!(!config.smtp.ssl);
        assert_eq!(config.smtp.timeout_seconds, Some(20));
        assert_eq!(config.smtp.from.as_deref(), Some("Info <info@example.com>"));
    }

    #[test]
    fn test_default_values() {
        // Minimal config: flags default to off, credentials to none
        let toml_str = r#"
            [smtp]
            host = "smtp.example.com"
            port = 25
        "#;

        let builder = AppConfig::configure_defaults()
            .unwrap()
            .add_source(File::from_str(toml_str, FileFormat::Toml));

        let config: AppConfig = builder.build().unwrap().try_deserialize().unwrap();

        assert!(!config.smtp.ssl);
        assert!(!config.smtp.starttls);
        assert!(!config.smtp.accept_invalid_certs);
        assert!(!config.smtp.debug);
        assert_eq!(config.smtp.username, None);
        assert_eq!(config.smtp.password, None);
        assert_eq!(config.smtp.timeout_seconds, None);
        assert!(!config.quiet);
    }

    #[test]
    fn test_missing_smtp_section_is_rejected() {
        let toml_str = r#"
            log_level = "info"
        "#;

        let builder = AppConfig::configure_defaults()
            .unwrap()
            .add_source(File::from_str(toml_str, FileFormat::Toml));

        let res: Result<AppConfig, _> = builder.build().unwrap().try_deserialize();
        assert!(res.is_err());
    }

    #[test]
    fn test_invalid_config_type() {
        let toml_str = r#"
            [smtp]
            host = "smtp.example.com"
            port = "not a number"
        "#;

        let builder = AppConfig::configure_defaults()
            .unwrap()
            .add_source(File::from_str(toml_str, FileFormat::Toml));

        let res: Result<AppConfig, _> = builder.build().unwrap().try_deserialize();
        assert!(res.is_err());
    }
}
