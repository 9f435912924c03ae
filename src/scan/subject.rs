//! Scan subjects
//!
//! A subject is one scannable unit extracted from a message: a URL found in
//! the text, an attached file, or an attached image. Subjects carry their
//! own id so concurrent scans of the same message stay distinguishable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decoded RGB8 pixel buffer for image subjects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RgbPixels {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// What kind of content a subject wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Url,
    File,
    Image,
}

/// The subject's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubjectPayload {
    Url(String),
    File {
        name: String,
        bytes: Vec<u8>,
    },
    Image {
        name: String,
        bytes: Vec<u8>,
        /// Pre-decoded pixels, when the caller already has them.
        pixels: Option<RgbPixels>,
    },
}

/// One scannable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSubject {
    pub id: Uuid,
    pub payload: SubjectPayload,
    /// Message the subject was extracted from, when known.
    pub origin_message_id: Option<Uuid>,
}

impl ScanSubject {
    pub fn url(raw_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload: SubjectPayload::Url(raw_url.into()),
            origin_message_id: None,
        }
    }

    pub fn file(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload: SubjectPayload::File {
                name: name.into(),
                bytes,
            },
            origin_message_id: None,
        }
    }

    pub fn image(name: impl Into<String>, bytes: Vec<u8>, pixels: Option<RgbPixels>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload: SubjectPayload::Image {
                name: name.into(),
                bytes,
                pixels,
            },
            origin_message_id: None,
        }
    }

    pub fn from_message(mut self, message_id: Uuid) -> Self {
        self.origin_message_id = Some(message_id);
        self
    }

    pub fn kind(&self) -> SubjectKind {
        match &self.payload {
            SubjectPayload::Url(_) => SubjectKind::Url,
            SubjectPayload::File { .. } => SubjectKind::File,
            SubjectPayload::Image { .. } => SubjectKind::Image,
        }
    }

    /// Human-readable label used in threat records: the URL itself, or the
    /// attachment's file name.
    pub fn content_label(&self) -> &str {
        match &self.payload {
            SubjectPayload::Url(url) => url,
            SubjectPayload::File { name, .. } => name,
            SubjectPayload::Image { name, .. } => name,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
