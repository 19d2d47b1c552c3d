use std::collections::HashMap;
use std::path::PathBuf;

use uuid::Uuid;

/// Where an attachment's bytes come from.
///
/// `File` is read from disk at render time and any read failure aborts the
/// send. `Resource` is looked up in the [`ResourceResolver`] registered on
/// the mailer and is dropped from the message (with a warning) when the
/// lookup misses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    File(PathBuf),
    Resource(String),
}

impl AttachmentSource {
    /// Attachment backed by a file on disk.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Attachment backed by a bundled resource registered on the mailer.
    pub fn resource(path: impl Into<String>) -> Self {
        Self::Resource(path.into())
    }

    /// Filename carried in the part headers: the last segment of the
    /// locator.
    pub(crate) fn filename(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::Resource(path) => path
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or("")
                .to_string(),
        }
    }
}

/// One attachment accumulated on the mailer. The content id is what `cid:`
/// references in the HTML body resolve against; an empty id suppresses the
/// Content-ID header entirely.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub source: AttachmentSource,
    pub content_id: String,
}

/// Produces the identifiers assigned to attachments added without an
/// explicit content id.
#[cfg_attr(test, mockall::automock)]
pub trait ContentIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 identifiers, unique across a process and beyond.
pub struct UuidContentIdGenerator;

impl ContentIdGenerator for UuidContentIdGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Resolves logical resource paths to bytes bundled with the program.
///
/// Returning `None` is a valid outcome, not an error: the attachment is
/// omitted from the rendered message.
#[cfg_attr(test, mockall::automock)]
pub trait ResourceResolver: Send + Sync {
    fn resolve(&self, path: &str) -> Option<Vec<u8>>;
}

/// In-memory resource registry, typically filled from `include_bytes!`
/// blobs at startup.
#[derive(Debug, Default)]
pub struct StaticResources {
    entries: HashMap<String, Vec<u8>>,
}

impl StaticResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bytes` under `path`, replacing any previous entry.
    pub fn with(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(path.into(), bytes.into());
        self
    }
}

impl ResourceResolver for StaticResources {
    fn resolve(&self, path: &str) -> Option<Vec<u8>> {
        self.entries.get(path).cloned()
    }
}

/// Content type guessed from the filename extension;
/// application/octet-stream when the extension is unknown.
pub(crate) fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}
