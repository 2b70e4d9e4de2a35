//! # Image Sources
//!
//! An [`ImageHandle`] is an image whose natural pixel size is known. Layout
//! only ever asks for that size; the encoded bytes ride along untouched for
//! whatever paints the composition.
//!
//! Handles are built from file paths, data URIs, raw base64 strings or
//! in-memory bytes. Only the header is decoded: the image crate's format
//! sniffing reads the dimensions without touching pixel data.

use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PlacardError, Result};

/// A decoded image reference with its natural dimensions.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "ImageRepr", into = "ImageRepr")]
pub struct ImageHandle {
    width: u32,
    height: u32,
    source: Option<Arc<str>>,
    bytes: Option<Arc<Vec<u8>>>,
}

/// JSON spellings: a source string, or bare dimensions for placeholders.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ImageRepr {
    Source(String),
    Dimensions { width: u32, height: u32 },
}

impl TryFrom<ImageRepr> for ImageHandle {
    type Error = PlacardError;

    fn try_from(repr: ImageRepr) -> Result<Self> {
        match repr {
            ImageRepr::Source(src) => ImageHandle::from_source(&src),
            ImageRepr::Dimensions { width, height } => Ok(ImageHandle::with_dimensions(width, height)),
        }
    }
}

impl From<ImageHandle> for ImageRepr {
    fn from(handle: ImageHandle) -> Self {
        match handle.source {
            Some(src) => ImageRepr::Source(src.to_string()),
            None => ImageRepr::Dimensions {
                width: handle.width,
                height: handle.height,
            },
        }
    }
}

impl ImageHandle {
    /// A placeholder with known dimensions and no pixel data.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            source: None,
            bytes: None,
        }
    }

    /// Read dimensions from encoded image bytes (PNG, JPEG or WebP).
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let (width, height) = probe_dimensions(&bytes)?;
        Ok(Self {
            width,
            height,
            source: None,
            bytes: Some(Arc::new(bytes)),
        })
    }

    /// Load from a source string.
    ///
    /// Supported `src` formats:
    /// - `data:image/...;base64,...` data URI
    /// - file path starting with `/`, `./` or `../`
    /// - raw base64-encoded image data
    pub fn from_source(src: &str) -> Result<Self> {
        let bytes = read_source_bytes(src)?;
        let mut handle = Self::from_bytes(bytes)?;
        handle.source = Some(Arc::from(src));
        Ok(handle)
    }

    pub fn natural_width(&self) -> f64 {
        self.width as f64
    }

    pub fn natural_height(&self) -> f64 {
        self.height as f64
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The encoded image, if the handle was built from real data.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref().map(Vec::as_slice)
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.source == other.source
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sources are often multi-kilobyte data URIs.
        let source = self.source.as_deref().map(|s| {
            if s.len() > 32 {
                format!("{}…", s.chars().take(32).collect::<String>())
            } else {
                s.to_string()
            }
        });
        f.debug_struct("ImageHandle")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("source", &source)
            .field("bytes", &self.bytes.as_ref().map(|b| b.len()))
            .finish()
    }
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>> {
    // Data URI: data:image/png;base64,iVBOR...
    if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| PlacardError::Image("Invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit path prefixes count, since base64 text may contain '/'.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src)
            .map_err(|e| PlacardError::Image(format!("Failed to read image file '{}': {}", src, e)));
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| PlacardError::Image(format!("Base64 decode error: {}", e)))
}

fn probe_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    if data.len() < 4 {
        return Err(PlacardError::Image("Image data too short".to_string()));
    }
    image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PlacardError::Image(format!("Format detection error: {}", e)))?
        .into_dimensions()
        .map_err(|e| PlacardError::Image(format!("Failed to read image dimensions: {}", e)))
}
