use std::fmt;

use serde::Serialize;
use thiserror::Error;
use url::Url;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DataUriError {
    #[error("not an image data URI")]
    NotAnImageUri,

    #[error("malformed data URI")]
    Malformed,
}

//
// ─── IMAGE KIND ────────────────────────────────────────────────────────────────
//

/// Image format carried by a cell or embedded sheet image.
///
/// Legacy spreadsheet decoders tag binary cells with a single character
/// (`j`/`p`/`g`); sheet-level metadata may carry a full MIME string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// MIME subtype used when building a data URI.
    #[must_use]
    pub fn subtype(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpeg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
        }
    }

    /// Maps a legacy single-character type tag to a kind.
    #[must_use]
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'j' => Some(ImageKind::Jpeg),
            'p' => Some(ImageKind::Png),
            'g' => Some(ImageKind::Gif),
            _ => None,
        }
    }

    /// Maps a MIME hint such as `image/png` to a kind.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }
}

//
// ─── DATA URI ──────────────────────────────────────────────────────────────────
//

/// A validated `data:image/<kind>;base64,<payload>` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DataUri(String);

impl DataUri {
    /// Wraps a base64 payload as a data URI of the given kind.
    #[must_use]
    pub fn wrap(kind: ImageKind, payload: &str) -> Self {
        Self(format!("data:image/{};base64,{payload}", kind.subtype()))
    }

    /// Accepts a string that is already an image data URI.
    ///
    /// # Errors
    ///
    /// Returns `DataUriError::Malformed` if the string is not a parseable URI,
    /// or `DataUriError::NotAnImageUri` if it is a URI of some other shape.
    pub fn parse(raw: &str) -> Result<Self, DataUriError> {
        let url = Url::parse(raw).map_err(|_| DataUriError::Malformed)?;
        if url.scheme() != "data" || !url.path().starts_with("image/") {
            return Err(DataUriError::NotAnImageUri);
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
