#![forbid(unsafe_code)]

pub mod decode;
pub mod error;
pub mod model;
pub mod normalize;
pub mod time;

pub use decode::{ImageResolutionFailure, resolve_image};
pub use error::Error;
pub use normalize::{InvalidRowPolicy, NAME_COLUMN, NormalizeError, RowNormalizer};
pub use time::Clock;
