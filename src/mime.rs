use crate::attachment::{Attachment, AttachmentSource, ResourceResolver, content_type_for};
use crate::emailer::Emailer;
use crate::error::Error;
use lettre::message::header::{ContentDisposition, ContentId, ContentType};
use lettre::message::{MultiPart, SinglePart};
use lettre::Message;
use log::warn;
use std::fs;

/// Renders the accumulated message into transmittable form.
///
/// Tree shape: `multipart/related` wrapping the text/HTML alternative
/// cover as its first child, followed by one sibling part per resolved
/// attachment. The envelope carries the sender, the per-role recipient
/// lists in insertion order, the subject when non-empty, and the render
/// date.
pub(crate) fn render(emailer: &Emailer) -> Result<Message, Error> {
    // lettre strips the Bcc header at build time unless told to keep it
    let mut builder = Message::builder().date_now().keep_bcc();

    if let Some(from) = &emailer.from {
        builder = builder.from(from.to_mailbox()?);
    }
    for address in &emailer.to {
        builder = builder.to(address.to_mailbox()?);
    }
    for address in &emailer.cc {
        builder = builder.cc(address.to_mailbox()?);
    }
    for address in &emailer.bcc {
        builder = builder.bcc(address.to_mailbox()?);
    }
    if let Some(subject) = &emailer.subject {
        if !subject.is_empty() {
            builder = builder.subject(subject.clone());
        }
    }

    let mut related = MultiPart::related().multipart(cover_part(emailer));
    for attachment in &emailer.attachments {
        if let Some(part) = attachment_part(attachment, emailer.resources.as_ref())? {
            related = related.singlepart(part);
        }
    }

    Ok(builder.multipart(related)?)
}

/// The body alternatives, text before HTML so capable clients pick the
/// richer part. Kept as an empty container when neither body is set.
fn cover_part(emailer: &Emailer) -> MultiPart {
    let mut cover = MultiPart::alternative().build();
    if let Some(text) = &emailer.text_body {
        if !text.is_empty() {
            cover = cover.singlepart(SinglePart::plain(text.clone()));
        }
    }
    if let Some(html) = &emailer.html_body {
        if !html.is_empty() {
            cover = cover.singlepart(SinglePart::html(html.clone()));
        }
    }
    cover
}

/// Resolves one attachment to a MIME part.
///
/// File reads propagate failures; a resource that misses the registry
/// yields `Ok(None)` and the message goes out without it.
fn attachment_part(
    attachment: &Attachment,
    resources: &dyn ResourceResolver,
) -> Result<Option<SinglePart>, Error> {
    let content = match &attachment.source {
        AttachmentSource::File(path) => {
            fs::read(path).map_err(|source| Error::AttachmentRead {
                path: path.clone(),
                source,
            })?
        }
        AttachmentSource::Resource(path) => match resources.resolve(path) {
            Some(content) => content,
            None => {
                warn!("skipping unresolved resource attachment {:?}", path);
                return Ok(None);
            }
        },
    };

    let filename = attachment.source.filename();
    let mut part = SinglePart::builder()
        .header(parse_content_type(&content_type_for(&filename)))
        .header(ContentDisposition::attachment(&filename));
    if !attachment.content_id.is_empty() {
        part = part.header(ContentId::from(format!("<{}>", attachment.content_id)));
    }
    Ok(Some(part.body(content)))
}

fn parse_content_type(value: &str) -> ContentType {
    ContentType::parse(value)
        .or_else(|_| ContentType::parse("application/octet-stream"))
        .unwrap_or(ContentType::TEXT_PLAIN)
}

#[cfg(test)]
#[path = "./mime_tests.rs"]
mod mime_tests;
