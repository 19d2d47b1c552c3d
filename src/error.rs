use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while composing or delivering a message.
///
/// Configuration problems surface at construction or at `send` entry,
/// address and attachment problems while the MIME tree is assembled, and
/// transport problems once the SMTP session is open. A send either
/// delivers the whole message or fails with one of these; no partial
/// message is ever transmitted.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid builder state: empty host, zero port, mismatched or empty
    /// credentials, a missing sender or an empty recipient set.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An email address the mail library refused to parse.
    #[error("malformed email address {address:?}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// A file attachment could not be read; the send is aborted before any
    /// network I/O happens.
    #[error("cannot read attachment {path:?}")]
    AttachmentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection, authentication or protocol failure during the SMTP
    /// transaction.
    #[error("SMTP transport failure: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The mail library rejected the assembled message. Not expected once
    /// the builder-level checks have passed.
    #[error("message assembly failed: {0}")]
    Compose(#[from] lettre::error::Error),
}
