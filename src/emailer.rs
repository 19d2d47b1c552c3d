use crate::attachment::{
    Attachment, AttachmentSource, ContentIdGenerator, ResourceResolver, StaticResources,
    UuidContentIdGenerator,
};
use crate::error::Error;
use crate::mime;
use crate::transport::{RealSmtpMailerFactory, SessionConfig, SmtpMailerFactory};
use log::{debug, info};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// An email address with an optional display name.
///
/// Only non-emptiness is checked here; full RFC syntax is validated by the
/// mail library when the message is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub(crate) email: String,
    pub(crate) name: Option<String>,
}

impl Address {
    /// Bare address. Fails when `email` is empty.
    pub fn new(email: impl Into<String>) -> Result<Self, Error> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(Error::Configuration(
                "email address can not be empty".to_string(),
            ));
        }
        Ok(Self { email, name: None })
    }

    /// Address with a display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Result<Self, Error> {
        let mut address = Self::new(email)?;
        address.name = Some(name.into());
        Ok(address)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Mailbox for the wire, parsed by the mail library.
    pub(crate) fn to_mailbox(&self) -> Result<lettre::message::Mailbox, Error> {
        let parsed = self.email.parse().map_err(|source| Error::Address {
            address: self.email.clone(),
            source,
        })?;
        Ok(lettre::message::Mailbox::new(self.name.clone(), parsed))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Accepts `Display Name <user@host>` or a bare `user@host`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let (Some(start), Some(end)) = (s.find('<'), s.rfind('>')) {
            if start < end {
                let name = s[..start].trim();
                let email = s[start + 1..end].trim();
                return if name.is_empty() {
                    Address::new(email)
                } else {
                    Address::with_name(email, name)
                };
            }
        }
        Address::new(s)
    }
}

/// Builder for one outgoing message and the SMTP session that carries it.
///
/// Construct with [`Emailer::new`], populate with the fluent setters, then
/// consume with [`Emailer::send`]. One `Emailer` is one message: `send`
/// takes the builder by value, so it can never be half-reused.
pub struct Emailer {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) from: Option<Address>,
    pub(crate) to: Vec<Address>,
    pub(crate) cc: Vec<Address>,
    pub(crate) bcc: Vec<Address>,
    pub(crate) subject: Option<String>,
    pub(crate) text_body: Option<String>,
    pub(crate) html_body: Option<String>,
    pub(crate) attachments: Vec<Attachment>,
    pub(crate) ssl: bool,
    pub(crate) starttls: bool,
    pub(crate) debug: bool,
    pub(crate) accept_invalid_certs: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) resources: Arc<dyn ResourceResolver>,
    pub(crate) content_ids: Arc<dyn ContentIdGenerator>,
    pub(crate) mailer_factory: Arc<dyn SmtpMailerFactory>,
}

impl Emailer {
    /// Creates a builder for the given SMTP endpoint.
    ///
    /// `username` and `password` must be both present (SMTP AUTH) or both
    /// absent (anonymous submission); a lone credential is rejected here
    /// rather than surprising the caller at send time.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, Error> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(Error::Configuration(
                "host name can not be empty".to_string(),
            ));
        }
        if port == 0 {
            return Err(Error::Configuration("port should be positive".to_string()));
        }
        match (&username, &password) {
            (Some(username), Some(password)) => {
                if username.is_empty() || password.is_empty() {
                    return Err(Error::Configuration(
                        "username and password can not be empty".to_string(),
                    ));
                }
            }
            (None, None) => {}
            _ => {
                return Err(Error::Configuration(
                    "username and password must be set together".to_string(),
                ));
            }
        }

        Ok(Self {
            host,
            port,
            username,
            password,
            from: None,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: None,
            text_body: None,
            html_body: None,
            attachments: Vec::new(),
            ssl: false,
            starttls: false,
            debug: false,
            accept_invalid_certs: false,
            timeout: None,
            resources: Arc::new(StaticResources::new()),
            content_ids: Arc::new(UuidContentIdGenerator),
            mailer_factory: Arc::new(RealSmtpMailerFactory),
        })
    }

    /// Sets the sender. Must be set before `send`.
    pub fn from(mut self, address: Address) -> Self {
        self.from = Some(address);
        self
    }

    /// Appends a primary recipient. Insertion order is preserved on the
    /// wire; duplicates are kept.
    pub fn to(mut self, address: Address) -> Self {
        self.to.push(address);
        self
    }

    /// Appends a carbon-copy recipient.
    pub fn cc(mut self, address: Address) -> Self {
        self.cc.push(address);
        self
    }

    /// Appends a blind-carbon-copy recipient.
    pub fn bcc(mut self, address: Address) -> Self {
        self.bcc.push(address);
        self
    }

    /// Sets the subject line. UTF-8 is handled by the mail library's header
    /// encoding; an empty subject is omitted from the message.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the plain-text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    /// Sets the HTML body. May reference attachments through `cid:` URLs
    /// matching their content ids.
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    /// Adds an attachment with a generated content id.
    pub fn add_attachment(mut self, source: AttachmentSource) -> Self {
        let content_id = self.content_ids.generate();
        self.attachments.push(Attachment { source, content_id });
        self
    }

    /// Adds an attachment with an explicit content id so the HTML body can
    /// reference it as `cid:id`. An empty id suppresses the Content-ID
    /// header.
    pub fn add_attachment_with_id(
        mut self,
        source: AttachmentSource,
        id: impl Into<String>,
    ) -> Self {
        self.attachments.push(Attachment {
            source,
            content_id: id.into(),
        });
        self
    }

    /// Implicit TLS: the connection is encrypted from the first byte
    /// (typically port 465).
    pub fn ssl(mut self, enabled: bool) -> Self {
        self.ssl = enabled;
        self
    }

    /// Mandatory STARTTLS: plaintext connect upgraded in-band (typically
    /// port 587). Ignored when `ssl` is also set.
    pub fn starttls(mut self, enabled: bool) -> Self {
        self.starttls = enabled;
        self
    }

    /// Verbose session logging, including the redacted configuration dump.
    /// Has no effect on certificate checking.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Disables server-certificate verification. Only for test servers
    /// with self-signed certificates; independent from `debug`.
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    /// Socket timeout for the SMTP session. The transport default applies
    /// when unset.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the bundled-resource registry consulted by `Resource`
    /// attachments.
    pub fn with_resources(mut self, resources: Arc<dyn ResourceResolver>) -> Self {
        self.resources = resources;
        self
    }

    /// Replaces the content-id generator used for attachments added
    /// without an explicit id.
    pub fn with_content_ids(mut self, generator: Arc<dyn ContentIdGenerator>) -> Self {
        self.content_ids = generator;
        self
    }

    /// Replaces the transport factory, letting tests and embedders
    /// substitute the SMTP layer.
    pub fn with_mailer_factory(mut self, factory: Arc<dyn SmtpMailerFactory>) -> Self {
        self.mailer_factory = factory;
        self
    }

    pub(crate) fn session_config(&self) -> SessionConfig {
        SessionConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            ssl: self.ssl,
            starttls: self.starttls,
            accept_invalid_certs: self.accept_invalid_certs,
            debug: self.debug,
            timeout: self.timeout,
        }
    }

    /// Renders the message and delivers it over a blocking SMTP session.
    ///
    /// The builder is validated and the MIME tree assembled (file
    /// attachments read, resources resolved) before the connection is
    /// opened, so a message that fails to compose never touches the
    /// network. Returns once the server has accepted the message or the
    /// transaction failed.
    pub fn send(self) -> Result<(), Error> {
        if self.from.is_none() {
            return Err(Error::Configuration("from address is not set".to_string()));
        }
        if self.to.is_empty() && self.bcc.is_empty() {
            return Err(Error::Configuration("no recipients given".to_string()));
        }

        if self.debug {
            info!("sending with configuration:\n{}", self);
        }

        let message = mime::render(&self)?;
        if self.debug {
            info!("rendered message: {} bytes", message.formatted().len());
        }

        let config = self.session_config();
        let mailer = self.mailer_factory.create(&config)?;
        mailer.send(&message)?;

        let recipients = self.to.len() + self.cc.len() + self.bcc.len();
        debug!(
            "message delivered to {} recipient(s) via {}:{}",
            recipients, self.host, self.port
        );
        Ok(())
    }
}

// The diagnostic dump: everything needed to reproduce a session except the
// password, which is always masked.
impl fmt::Display for Emailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "smtp: {}:{}", self.host, self.port)?;
        writeln!(
            f,
            "tls: ssl={} starttls={} accept_invalid_certs={}",
            self.ssl, self.starttls, self.accept_invalid_certs
        )?;
        match &self.username {
            Some(username) => writeln!(f, "auth: {} ***", username)?,
            None => writeln!(f, "auth: none")?,
        }
        match self.timeout {
            Some(timeout) => writeln!(f, "timeout: {:?}", timeout)?,
            None => writeln!(f, "timeout: transport default")?,
        }
        match &self.from {
            Some(from) => writeln!(f, "from: {}", from)?,
            None => writeln!(f, "from: (unset)")?,
        }
        writeln!(f, "to: {}", join_addresses(&self.to))?;
        writeln!(f, "cc: {}", join_addresses(&self.cc))?;
        writeln!(f, "bcc: {}", join_addresses(&self.bcc))?;
        writeln!(f, "subject: {}", self.subject.as_deref().unwrap_or(""))?;
        writeln!(
            f,
            "body: text={} chars, html={} chars",
            self.text_body.as_deref().map_or(0, str::len),
            self.html_body.as_deref().map_or(0, str::len),
        )?;
        write!(f, "attachments: {}", self.attachments.len())?;
        for attachment in &self.attachments {
            write!(
                f,
                "\n  - {:?} (cid: {})",
                attachment.source, attachment.content_id
            )?;
        }
        Ok(())
    }
}

fn join_addresses(addresses: &[Address]) -> String {
    if addresses.is_empty() {
        return "-".to_string();
    }
    addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "./emailer_tests.rs"]
mod emailer_tests;
