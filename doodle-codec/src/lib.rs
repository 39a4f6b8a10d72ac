//! # Doodle Codec
//!
//! Moves pixels in and out of Doodle surfaces.
//!
//! ```text
//! bytes / base64 / data URI ──decode──▶ SourceBitmap ──blit──▶ Surface
//!                                                                │
//!        EncodedBitmap (PNG, base64, data URI) ◀──export─────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod decode;
pub mod error;
pub mod export;

pub use decode::{
    decode_base64, decode_bytes, decode_data_uri, parse_data_uri, thumbnail, ImageFormat,
};
pub use error::{CodecError, CodecResult};
pub use export::{export_bitmap, export_png, export_surface, write_png, EncodedBitmap};
