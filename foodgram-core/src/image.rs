//! Decoding of images submitted inline as base64 data URIs.
//!
//! Recipe pictures and avatars arrive as `data:image/<ext>;base64,<payload>`.
//! The declared type is only used as a sanity check: the stored format is the
//! one sniffed from the decoded bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::ImageFormat;
use uuid::Uuid;

use crate::error::ImageError;

/// Allowed image formats for recipe pictures and avatars.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum decoded size for images (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// An image decoded from a data URI, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub data: Vec<u8>,
    /// e.g. "image/png"
    pub content_type: String,
    /// Preferred file extension without the dot, e.g. "png".
    pub extension: String,
}

impl DecodedImage {
    /// A fresh unique file name for this image, e.g. `3f2a...e1.png`.
    pub fn generate_file_name(&self) -> String {
        format!("{}.{}", Uuid::new_v4().simple(), self.extension)
    }
}

/// Detect the format of raw image bytes and check it is allowed.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, ImageError> {
    if data.is_empty() {
        return Err(ImageError::Empty);
    }

    let format = image::guess_format(data).map_err(|_| ImageError::UnknownFormat)?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::UnsupportedFormat(format!("{:?}", format)));
    }

    Ok(format)
}

/// Decode a `data:image/<ext>;base64,<payload>` string.
pub fn decode_data_uri(value: &str) -> Result<DecodedImage, ImageError> {
    let rest = value
        .trim()
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or(ImageError::MalformedDataUri)?;

    let (declared, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or(ImageError::MalformedDataUri)?;

    if declared.is_empty() {
        return Err(ImageError::MalformedDataUri);
    }

    // Some clients wrap long payloads.
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    // Cheap upper bound before allocating the decoded buffer
    let estimated = payload.len() / 4 * 3;
    if estimated > MAX_FILE_SIZE + 3 {
        return Err(ImageError::TooLarge {
            size: estimated,
            max: MAX_FILE_SIZE,
        });
    }

    let data = STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;

    if data.len() > MAX_FILE_SIZE {
        return Err(ImageError::TooLarge {
            size: data.len(),
            max: MAX_FILE_SIZE,
        });
    }

    let format = validate_image(&data)?;
    let extension = format
        .extensions_str()
        .first()
        .copied()
        .unwrap_or(declared)
        .to_string();

    Ok(DecodedImage {
        data,
        content_type: format.to_mime_type().to_string(),
        extension,
    })
}
