use crate::transport::{RealSmtpMailerFactory, SessionConfig, SmtpMailerFactory};
use std::time::Duration;

fn test_session_config() -> SessionConfig {
    SessionConfig {
        host: "smtp.test.com".to_string(),
        port: 465,
        username: Some("sender@test.com".to_string()),
        password: Some("pass".to_string()),
        ssl: true,
        starttls: false,
        accept_invalid_certs: false,
        debug: false,
        timeout: Some(Duration::from_secs(30)),
    }
}

#[test]
fn test_auth_enabled_only_with_both_credentials() {
    let mut config = test_session_config();
    assert!(config.auth_enabled());

    config.password = None;
    assert!(!config.auth_enabled());

    config.username = None;
    assert!(!config.auth_enabled());
}

#[test]
fn test_debug_output_masks_password() {
    let config = test_session_config();
    let dump = format!("{:?}", config);

    assert!(dump.contains("smtp.test.com"));
    assert!(dump.contains("sender@test.com"));
    assert!(dump.contains("***"));
    assert!(!dump.contains("\"pass\""));
}

#[test]
fn test_factory_creates_transport_for_each_tls_mode() {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let factory = RealSmtpMailerFactory;

    let wrapped = test_session_config();
    assert!(factory.create(&wrapped).is_ok());

    let mut starttls = test_session_config();
    starttls.ssl = false;
    starttls.starttls = true;
    starttls.port = 587;
    assert!(factory.create(&starttls).is_ok());

    let mut plain = test_session_config();
    plain.ssl = false;
    plain.port = 25;
    plain.timeout = None;
    assert!(factory.create(&plain).is_ok());
}

#[test]
fn test_factory_accepts_invalid_cert_override() {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let factory = RealSmtpMailerFactory;
    let mut config = test_session_config();
    config.accept_invalid_certs = true;

    assert!(factory.create(&config).is_ok());
}

#[test]
fn test_factory_without_credentials_builds_anonymous_transport() {
    let factory = RealSmtpMailerFactory;
    let mut config = test_session_config();
    config.username = None;
    config.password = None;
    config.ssl = false;
    config.port = 25;

    assert!(factory.create(&config).is_ok());
}
