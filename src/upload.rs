use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("not an image: {0}")]
    InvalidMediaType(String),
}

/// An image ready for embedding in a generation request: the raw bytes as
/// standard base64 plus the media type the browser declared for the file.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: String,
    pub media_type: String,
}

/// Validate and encode an uploaded file. Only the declared media type is
/// checked (`image/*`); size and format limits are left to the remote
/// service, which rejects what it cannot animate.
pub fn capture(bytes: &[u8], media_type: &str) -> Result<EncodedImage, UploadError> {
    if !media_type.starts_with("image/") {
        return Err(UploadError::InvalidMediaType(media_type.to_string()));
    }
    Ok(EncodedImage {
        data: base64::engine::general_purpose::STANDARD.encode(bytes),
        media_type: media_type.to_string(),
    })
}
