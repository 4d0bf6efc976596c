use std::fmt;
use std::sync::Arc;

use crate::model::image::ImageKind;

//
// ─── CELL VALUES ───────────────────────────────────────────────────────────────
//

/// One decoded spreadsheet cell.
///
/// Legacy decoders emit binary image cells as tagged objects; the tag has
/// already been mapped to an [`ImageKind`] by the time a row reaches this
/// crate (see [`ImageKind::from_tag`]).
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Binary { kind: ImageKind, payload: String },
}

impl CellValue {
    pub fn text(raw: impl Into<String>) -> Self {
        CellValue::Text(raw.into())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

//
// ─── CELL ADDRESS ──────────────────────────────────────────────────────────────
//

/// Zero-based (row, column) coordinate of a cell.
///
/// Displays in A1 notation for diagnostics and matches embedded-image
/// origins by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    #[must_use]
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut col = self.col;
        let mut letters = String::new();
        loop {
            letters.insert(0, char::from(b'A' + (col % 26) as u8));
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        write!(f, "{letters}{}", self.row + 1)
    }
}

//
// ─── SHEET-LEVEL IMAGE METADATA ────────────────────────────────────────────────
//

/// An image embedded in the sheet, anchored at a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetImage {
    pub origin: CellAddress,
    /// Base64 payload as extracted by the upstream decoder.
    pub data: String,
    pub kind: Option<ImageKind>,
}

/// Sheet-level metadata shared by every row of the same sheet.
///
/// Rows hold an `Arc` to this; the pipeline reads it and never mutates it.
#[derive(Debug, Default, PartialEq)]
pub struct SheetMeta {
    images: Vec<SheetImage>,
}

impl SheetMeta {
    #[must_use]
    pub fn new(images: Vec<SheetImage>) -> Self {
        Self { images }
    }

    #[must_use]
    pub fn images(&self) -> &[SheetImage] {
        &self.images
    }

    #[must_use]
    pub fn image_at(&self, origin: CellAddress) -> Option<&SheetImage> {
        self.images.iter().find(|img| img.origin == origin)
    }
}

//
// ─── RAW ROW ───────────────────────────────────────────────────────────────────
//

/// One decoded spreadsheet record: an ordered label→value mapping.
///
/// Column order is semantic: the structured image lookup derives a cell
/// address from a label's position, so insertion order must match the
/// sheet's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    index: u32,
    columns: Vec<(String, CellValue)>,
    sheet: Option<Arc<SheetMeta>>,
}

impl RawRow {
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self {
            index,
            columns: Vec::new(),
            sheet: None,
        }
    }

    #[must_use]
    pub fn with_cell(mut self, label: impl Into<String>, value: CellValue) -> Self {
        self.columns.push((label.into(), value));
        self
    }

    #[must_use]
    pub fn with_sheet(mut self, sheet: Arc<SheetMeta>) -> Self {
        self.sheet = Some(sheet);
        self
    }

    /// Zero-based origin row in the sheet.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub fn sheet(&self) -> Option<&SheetMeta> {
        self.sheet.as_deref()
    }

    /// Columns in sheet order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.columns.iter().map(|(label, value)| (label.as_str(), value))
    }

    #[must_use]
    pub fn cell(&self, label: &str) -> Option<&CellValue> {
        self.columns
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, value)| value)
    }

    /// Column labels, for diagnostics.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|(label, _)| label.clone()).collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
