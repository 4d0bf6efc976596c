mod image;
mod question;
mod row;

pub use image::{DataUri, DataUriError, ImageKind};
pub use question::{Question, QuestionError};
pub use row::{CellAddress, CellValue, RawRow, SheetImage, SheetMeta};
