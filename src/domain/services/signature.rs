use base64::{Engine as _, engine::general_purpose};
use crate::error::AppError;

const DEFAULT_CONTENT_TYPE: &str = "image/png";

#[derive(Debug)]
pub struct SignaturePayload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SignaturePayload {
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            _ => "bin",
        }
    }
}

/// Accepts raw base64 or a `data:image/...;base64,` URL as sent by signature pads.
pub fn decode_signature(raw: &str, max_bytes: usize) -> Result<SignaturePayload, AppError> {
    let raw = raw.trim();

    let (content_type, encoded) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest.split_once(',')
                .ok_or(AppError::Validation("Malformed signature data URL".into()))?;
            let mime = header.strip_suffix(";base64")
                .ok_or(AppError::Validation("Signature data URL must be base64 encoded".into()))?;
            (mime.to_ascii_lowercase(), data)
        }
        None => (DEFAULT_CONTENT_TYPE.to_string(), raw),
    };

    if !content_type.starts_with("image/") {
        return Err(AppError::Validation(format!("Unsupported signature type {}", content_type)));
    }

    // base64 expands 3 bytes into 4 characters
    if encoded.len() / 4 * 3 > max_bytes + 3 {
        return Err(AppError::Validation("Signature is too large".into()));
    }

    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| AppError::Validation("Signature is not valid base64".into()))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Signature is empty".into()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::Validation("Signature is too large".into()));
    }

    Ok(SignaturePayload { content_type, bytes })
}
