//! Compose multipart MIME email and deliver it over blocking SMTP.
//!
//! `mail-dispatch` builds messages with plain-text and HTML alternatives,
//! file attachments, and embedded resources referenced from the HTML body
//! through `cid:` URLs, then hands them to [lettre] for delivery with
//! optional SMTP AUTH, implicit TLS, or STARTTLS.
//!
//! The rendered tree is `multipart/related` wrapping a
//! `multipart/alternative` cover (text before HTML) plus one part per
//! attachment, which is what mail clients expect for inline images.
//!
//! ```no_run
//! use std::sync::Arc;
//! use mail_dispatch::{Address, AttachmentSource, Emailer, StaticResources};
//!
//! fn main() -> Result<(), mail_dispatch::Error> {
//!     let resources = StaticResources::new().with("logo.png", b"png bytes".to_vec());
//!
//!     Emailer::new(
//!         "smtp.example.com",
//!         587,
//!         Some("user".to_string()),
//!         Some("secret".to_string()),
//!     )?
//!     .starttls(true)
//!     .with_resources(Arc::new(resources))
//!     .from(Address::with_name("info@example.com", "Info")?)
//!     .to(Address::new("someone@example.org")?)
//!     .subject("Monthly report")
//!     .text("See the attached report.")
//!     .html(r#"<p><img src="cid:logo"> See the attached report.</p>"#)
//!     .add_attachment_with_id(AttachmentSource::resource("logo.png"), "logo")
//!     .add_attachment(AttachmentSource::file("/tmp/report.pdf"))
//!     .send()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Sends are synchronous: [`Emailer::send`] blocks until the server
//! accepts the message or the transaction fails, and consumes the builder
//! so one `Emailer` is exactly one send.
//!
//! [lettre]: https://crates.io/crates/lettre

mod attachment;
mod emailer;
mod error;
mod mime;
mod transport;

pub use attachment::{
    Attachment, AttachmentSource, ContentIdGenerator, ResourceResolver, StaticResources,
    UuidContentIdGenerator,
};
pub use emailer::{Address, Emailer};
pub use error::Error;
pub use transport::{RealSmtpMailerFactory, SessionConfig, SmtpMailer, SmtpMailerFactory};
