//! `multipart/related` framing for Drive media uploads.
//!
//! The media part is never buffered: the framing only carries the bytes
//! before and after it, and the body is streamed from the file in between.

use uuid::Uuid;

/// Framing around a media part plus the content type that announces it.
#[derive(Debug)]
pub(crate) struct RelatedFraming {
    pub(crate) content_type: String,
    pub(crate) preamble: Vec<u8>,
    pub(crate) epilogue: Vec<u8>,
}

impl RelatedFraming {
    /// Total body length once `media_len` bytes of media are placed between
    /// the preamble and the epilogue.
    pub(crate) fn content_length(&self, media_len: u64) -> u64 {
        (self.preamble.len() + self.epilogue.len()) as u64 + media_len
    }
}

/// Random boundary unlikely to collide with archive bytes.
pub(crate) fn new_boundary() -> String {
    format!("stowage-{}", Uuid::new_v4().simple())
}

/// Frame a JSON metadata part followed by a media part of type `media_type`.
pub(crate) fn related_framing(
    boundary: &str,
    metadata_json: &[u8],
    media_type: &str,
) -> RelatedFraming {
    let mut preamble = Vec::with_capacity(metadata_json.len() + 160);
    preamble.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    preamble.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    preamble.extend_from_slice(metadata_json);
    preamble.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    preamble.extend_from_slice(format!("Content-Type: {media_type}\r\n\r\n").as_bytes());
    RelatedFraming {
        content_type: format!("multipart/related; boundary={boundary}"),
        preamble,
        epilogue: format!("\r\n--{boundary}--\r\n").into_bytes(),
    }
}
