use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Expected a data URI of the form data:image/<type>;base64,<payload>")]
    MalformedDataUri,

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("Image is empty")]
    Empty,

    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Could not detect image format")]
    UnknownFormat,

    #[error("Unsupported image format: {0}. Allowed: JPEG, PNG, GIF, WebP")]
    UnsupportedFormat(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortLinkError {
    #[error("Could not allocate a unique short code after {attempts} attempts")]
    Exhausted { attempts: usize },
}
