//! Resolves a row's associated image to a canonical data URI.
//!
//! Spreadsheets arrive with several inconsistent image conventions:
//! sheet-level embedded images anchored at a cell, legacy binary cells
//! tagged with a one-character format code, and inline strings that are
//! either full data URIs or bare base64 blobs. The strategies are tried
//! in that order; the first hit wins.

use tracing::warn;

use crate::model::{CellAddress, CellValue, DataUri, ImageKind, RawRow};

/// Column-label keywords that mark a column as image-bearing.
///
/// "图" also covers 图片/示意图 and friends via substring match; "img" covers
/// "image". ASCII keywords are matched case-insensitively.
const PICTURE_KEYWORDS: [&str; 4] = ["图", "照片", "img", "photo"];

//
// ─── FAILURE ───────────────────────────────────────────────────────────────────
//

/// Diagnostic payload returned when no strategy can resolve an image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResolutionFailure {
    pub available_columns: Vec<String>,
    pub row: RawRow,
}

impl ImageResolutionFailure {
    fn for_row(row: &RawRow) -> Self {
        Self {
            available_columns: row.labels(),
            row: row.clone(),
        }
    }
}

//
// ─── CELL CLASSIFIER ───────────────────────────────────────────────────────────
//

/// Image-bearing shapes a cell value may take.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ImageCell<'a> {
    Binary { kind: ImageKind, payload: &'a str },
    DataUri(&'a str),
    Base64Blob(&'a str),
}

/// Decides whether a single cell value can stand in for an image.
fn classify_image_cell(value: &CellValue) -> Option<ImageCell<'_>> {
    match value {
        CellValue::Binary { kind, payload } if !payload.is_empty() => Some(ImageCell::Binary {
            kind: *kind,
            payload,
        }),
        CellValue::Text(s) if s.starts_with("data:image") => Some(ImageCell::DataUri(s)),
        CellValue::Text(s) if looks_like_base64_blob(s) => Some(ImageCell::Base64Blob(s)),
        _ => None,
    }
}

/// A bare string passes for a base64 image payload when it is long enough
/// and stays within the base64 alphabet.
fn looks_like_base64_blob(s: &str) -> bool {
    s.len() >= 20
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
}

//
// ─── RESOLUTION ────────────────────────────────────────────────────────────────
//

/// Resolves the row's image to a data URI, trying each strategy in order.
///
/// The row is never mutated. On failure the returned value carries the
/// column labels and a snapshot of the row for upstream diagnostics.
///
/// # Errors
///
/// Returns [`ImageResolutionFailure`] when no strategy matches.
pub fn resolve_image(row: &RawRow) -> Result<DataUri, ImageResolutionFailure> {
    if let Some(uri) = structured_lookup(row) {
        return Ok(uri);
    }
    if let Some(uri) = binary_fallback(row) {
        return Ok(uri);
    }
    if let Some(uri) = string_fallback(row) {
        return Ok(uri);
    }

    warn!(row = row.index(), columns = ?row.labels(), "no strategy could resolve an image");
    Err(ImageResolutionFailure::for_row(row))
}

/// Strategy 1: match an embedded sheet image anchored at a picture column.
fn structured_lookup(row: &RawRow) -> Option<DataUri> {
    let Some(sheet) = row.sheet() else {
        warn!(row = row.index(), "row carries no sheet image metadata");
        return None;
    };

    let candidates = picture_columns(row);
    if candidates.is_empty() {
        warn!(row = row.index(), columns = ?row.labels(), "no picture column found");
        return None;
    }

    for col in candidates {
        let address = CellAddress::new(row.index(), col);
        if let Some(image) = sheet.image_at(address) {
            if image.data.is_empty() {
                continue;
            }
            let kind = image.kind.unwrap_or(ImageKind::Jpeg);
            return Some(DataUri::wrap(kind, &image.data));
        }
    }
    None
}

/// Positions of columns whose label names a picture.
fn picture_columns(row: &RawRow) -> Vec<u32> {
    row.columns()
        .enumerate()
        .filter(|(_, (label, _))| {
            let lower = label.to_lowercase();
            PICTURE_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .filter_map(|(position, _)| u32::try_from(position).ok())
        .collect()
}

/// Strategy 2: first legacy binary cell, in column order.
fn binary_fallback(row: &RawRow) -> Option<DataUri> {
    row.columns().find_map(|(_, value)| match classify_image_cell(value) {
        Some(ImageCell::Binary { kind, payload }) => Some(DataUri::wrap(kind, payload)),
        _ => None,
    })
}

/// Strategy 3: first string cell that is a data URI or a bare base64 blob.
fn string_fallback(row: &RawRow) -> Option<DataUri> {
    for (_, value) in row.columns() {
        match classify_image_cell(value) {
            Some(ImageCell::DataUri(s)) => {
                if let Ok(uri) = DataUri::parse(s) {
                    return Some(uri);
                }
                warn!(row = row.index(), "data URI cell failed to parse");
            }
            Some(ImageCell::Base64Blob(s)) => {
                return Some(DataUri::wrap(ImageKind::Jpeg, s));
            }
            _ => {}
        }
    }
    None
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
