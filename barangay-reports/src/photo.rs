use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use barangay_shared::errors::{AppError, AppResult, ErrorCode};

/// A photo encoded as a `data:` URL, ready to be stored inline on a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePhoto(String);

impl InlinePhoto {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum PhotoSource {
    File(PathBuf),
    Bytes { bytes: Vec<u8>, mime: String },
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Read and encode a photo. Completes before the report is written.
pub async fn encode_photo(source: PhotoSource, max_bytes: usize) -> AppResult<InlinePhoto> {
    let (bytes, mime) = match source {
        PhotoSource::File(path) => {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                AppError::new(
                    ErrorCode::PhotoUnreadable,
                    format!("cannot read photo {}: {e}", path.display()),
                )
            })?;
            (bytes, mime_for(&path).to_string())
        }
        PhotoSource::Bytes { bytes, mime } => (bytes, mime),
    };

    if bytes.len() > max_bytes {
        return Err(AppError::new(
            ErrorCode::PhotoTooLarge,
            format!("photo is {} bytes, limit is {max_bytes}", bytes.len()),
        ));
    }

    tracing::debug!(bytes = bytes.len(), mime = %mime, "photo encoded");
    Ok(InlinePhoto(format!("data:{mime};base64,{}", STANDARD.encode(&bytes))))
}
