use std::fmt::{Display, Formatter};
use std::io::Cursor;
use std::path::Path;

use image::{GrayImage, ImageFormat, ImageResult};
use log::debug;

use crate::builder::QRBuilder;
use crate::common::{error::QRError, metadata::ECLevel};
use crate::render::{render, ModuleGrid, ScaleMode, QUIET_ZONE};

// Symbol encoder seam
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum EncodeError {
    /// The data does not fit any symbol at the requested level.
    Capacity(QRError),
    /// The encoder cannot produce symbols at all.
    Unavailable(String),
}

/// Produces the module matrix for a payload. The built-in encoder is used unless
/// another one is supplied through [`Generator::with_encoder`].
pub trait SymbolEncoder: Send + Sync {
    fn encode(&self, data: &[u8], ecl: ECLevel) -> Result<ModuleGrid, EncodeError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinEncoder;

impl SymbolEncoder for BuiltinEncoder {
    fn encode(&self, data: &[u8], ecl: ECLevel) -> Result<ModuleGrid, EncodeError> {
        let qr = QRBuilder::new(data).ec_level(ecl).build().map_err(EncodeError::Capacity)?;
        Ok(qr.to_grid())
    }
}

// Errors
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ErrorKind {
    InvalidSize,
    Encoding,
    EncoderUnavailable,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let kind = match self {
            Self::InvalidSize => "invalid size",
            Self::Encoding => "encoding error",
            Self::EncoderUnavailable => "encoder unavailable",
        };
        f.write_str(kind)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GenerateError {
    kind: ErrorKind,
    message: String,
    source: Option<QRError>,
}

impl GenerateError {
    fn invalid_size(width: u32, height: u32) -> Self {
        Self {
            kind: ErrorKind::InvalidSize,
            message: format!("target size must be positive, got {width}x{height}"),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<EncodeError> for GenerateError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::Capacity(e) => Self {
                kind: ErrorKind::Encoding,
                message: format!("text cannot be encoded: {e}"),
                source: Some(e),
            },
            EncodeError::Unavailable(message) => {
                Self { kind: ErrorKind::EncoderUnavailable, message, source: None }
            }
        }
    }
}

impl Display for GenerateError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// Bitmap
//------------------------------------------------------------------------------

/// Grayscale image of a rendered symbol. Dark pixels are 0, light pixels 255.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Bitmap(GrayImage);

impl Bitmap {
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] < 128
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_image(self) -> GrayImage {
        self.0
    }

    pub fn as_raw(&self) -> &[u8] {
        self.0.as_raw()
    }

    pub fn to_png(&self) -> ImageResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.0.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    /// Saves the bitmap, the format is picked from the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.0.save(path)
    }
}

// Generator
//------------------------------------------------------------------------------

/// Turns text into a QR code bitmap of an exact pixel size.
///
/// ```
/// use qrgenerator::{ECLevel, Generator, ScaleMode};
///
/// let bitmap = Generator::new()
///     .ec_level(ECLevel::Q)
///     .scale_mode(ScaleMode::Stretch)
///     .generate("HELLO", 300, 200)
///     .unwrap();
/// assert_eq!((bitmap.width(), bitmap.height()), (300, 200));
/// ```
#[derive(Debug, Clone)]
pub struct Generator<E = BuiltinEncoder> {
    encoder: E,
    ec_level: ECLevel,
    quiet_zone: u32,
    scale_mode: ScaleMode,
}

impl Default for Generator {
    fn default() -> Self {
        Self::with_encoder(BuiltinEncoder)
    }
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: SymbolEncoder> Generator<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self { encoder, ec_level: ECLevel::L, quiet_zone: QUIET_ZONE, scale_mode: ScaleMode::Fit }
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn quiet_zone(&mut self, quiet_zone: u32) -> &mut Self {
        self.quiet_zone = quiet_zone;
        self
    }

    pub fn scale_mode(&mut self, scale_mode: ScaleMode) -> &mut Self {
        self.scale_mode = scale_mode;
        self
    }

    pub fn generate(&self, text: &str, width: u32, height: u32) -> Result<Bitmap, GenerateError> {
        if width == 0 || height == 0 {
            return Err(GenerateError::invalid_size(width, height));
        }

        let grid = self.symbol(text)?;
        self.render(&grid, width, height)
    }

    /// Encodes `text` into its module grid with the configured encoder and level.
    pub fn symbol(&self, text: &str) -> Result<ModuleGrid, GenerateError> {
        Ok(self.encoder.encode(text.as_bytes(), self.ec_level)?)
    }

    /// Renders an already encoded grid with the configured quiet zone and scale mode.
    pub fn render(
        &self,
        grid: &ModuleGrid,
        width: u32,
        height: u32,
    ) -> Result<Bitmap, GenerateError> {
        if width == 0 || height == 0 {
            return Err(GenerateError::invalid_size(width, height));
        }
        debug!(
            "Rendering {w}x{w} modules into {width}x{height} pixels ({mode:?})",
            w = grid.width(),
            mode = self.scale_mode
        );
        Ok(Bitmap(render(grid, self.quiet_zone, width, height, self.scale_mode)))
    }
}

/// Generates a QR code for `text` at level L, scaled to exactly `width x height`.
pub fn generate(text: &str, width: u32, height: u32) -> Result<Bitmap, GenerateError> {
    Generator::new().generate(text, width, height)
}
