//! # qrgenerator
//!
//! Turns text into QR code bitmaps of an exact pixel size.
//!
//! The crate carries its own QR Model 2 encoder with Reed-Solomon error correction
//! and renders symbols with nearest-neighbour scaling, so every module stays a crisp
//! block of pixels regardless of the requested size.
//!
//! ## Features
//!
//! - **One call generation**: [`generate`] encodes at error correction level L and
//!   returns a grayscale bitmap of exactly the requested width and height
//! - **Configurable generator**: error correction level, quiet zone and how the square
//!   symbol is fitted on non-square canvases via [`Generator`]
//! - **Symbol builder**: pick version, error correction level and mask directly with
//!   [`QRBuilder`]
//! - **Swappable encoder**: plug a different symbol source behind [`SymbolEncoder`]
//!
//! ## Quick Start
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bitmap = qrgenerator::generate("Hello, World!", 1024, 1024)?;
//! assert_eq!((bitmap.width(), bitmap.height()), (1024, 1024));
//! let png = bitmap.to_png()?;
//! # assert!(!png.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use qrgenerator::{ECLevel, MaskPattern, QRBuilder, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::new(b"Hello, World!")
//!     .version(Version::new(2)?)      // smallest fitting version if not provided
//!     .ec_level(ECLevel::Q)           // defaults to ECLevel::M
//!     .mask(MaskPattern::new(3)?)     // lowest penalty mask if not provided
//!     .build()?;
//!
//! let img = qr.render(4);  // 4 pixels per module
//! assert_eq!(img.width(), (25 + 8) * 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! [`generate`] fails with one of the [`ErrorKind`]s:
//! - **InvalidSize**: width or height is zero
//! - **Encoding**: the text does not fit a version 40 symbol at the chosen level
//! - **EncoderUnavailable**: the configured [`SymbolEncoder`] cannot produce symbols
//!
//! Empty text is valid and yields a version 1 symbol with an empty payload.

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;
mod generator;
pub mod render;

pub use builder::{QRBuilder, QR};
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{ECLevel, Version};
pub use generator::{
    generate, Bitmap, BuiltinEncoder, EncodeError, ErrorKind, GenerateError, Generator,
    SymbolEncoder,
};
pub use render::{to_str, ModuleGrid, ScaleMode, QUIET_ZONE};
