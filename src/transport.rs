use crate::error::Error;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use log::debug;
use std::fmt;
use std::time::Duration;

/// Connection settings derived from an [`Emailer`](crate::Emailer)'s
/// transport fields; everything the SMTP layer needs and nothing more.
#[derive(Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS from the first byte.
    pub ssl: bool,
    /// Mandatory STARTTLS upgrade; ignored when `ssl` is set.
    pub starttls: bool,
    /// Skip server-certificate verification.
    pub accept_invalid_certs: bool,
    /// Verbose session logging.
    pub debug: bool,
    pub timeout: Option<Duration>,
}

impl SessionConfig {
    /// SMTP AUTH is used exactly when both credentials are present.
    pub fn auth_enabled(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

// The password must never reach logs or error output.
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("ssl", &self.ssl)
            .field("starttls", &self.starttls)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// Abstract the mailer so we can mock it
#[cfg_attr(test, mockall::automock)]
pub trait SmtpMailer: Send + Sync {
    fn send(&self, message: &Message) -> Result<(), Error>;
}

// Wrapper for the real lettre transport
pub struct RealSmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer for RealSmtpMailer {
    fn send(&self, message: &Message) -> Result<(), Error> {
        let response = self.transport.send(message)?;
        debug!("message accepted: {}", response.code());
        Ok(())
    }
}

// Factory trait
#[cfg_attr(test, mockall::automock)]
pub trait SmtpMailerFactory: Send + Sync {
    fn create(&self, config: &SessionConfig) -> Result<Box<dyn SmtpMailer>, Error>;
}

pub struct RealSmtpMailerFactory;

impl SmtpMailerFactory for RealSmtpMailerFactory {
    fn create(&self, config: &SessionConfig) -> Result<Box<dyn SmtpMailer>, Error> {
        if config.debug {
            debug!("building transport for {:?}", config);
        }

        let mut builder = SmtpTransport::relay(&config.host)?
            .port(config.port)
            .tls(select_tls(config)?);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(Some(timeout));
        }

        Ok(Box::new(RealSmtpMailer {
            transport: builder.build(),
        }))
    }
}

/// Maps the ssl/starttls pair onto the transport's TLS modes. `ssl` wins
/// when both are set, matching the connect-time precedence of a wrapped
/// socket.
fn select_tls(config: &SessionConfig) -> Result<Tls, Error> {
    if !config.ssl && !config.starttls {
        return Ok(Tls::None);
    }

    let mut params = TlsParameters::builder(config.host.clone());
    if config.accept_invalid_certs {
        params = params.dangerous_accept_invalid_certs(true);
    }
    let params = params.build()?;

    if config.ssl {
        Ok(Tls::Wrapper(params))
    } else {
        Ok(Tls::Required(params))
    }
}

#[cfg(test)]
#[path = "./transport_tests.rs"]
mod transport_tests;
