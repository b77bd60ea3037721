use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::{EgobotError, Result};

const FALLBACK_MIME: &str = "application/octet-stream";

pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("mp4") => "video/mp4",
        _ => FALLBACK_MIME,
    }
}

pub fn encode_file_base64(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|err| EgobotError::media(path, err))?;
    Ok(BASE64.encode(bytes))
}

pub fn data_uri_for_path(path: &Path) -> Result<String> {
    let encoded = encode_file_base64(path)?;
    Ok(format!("data:{};base64,{}", mime_for_path(path), encoded))
}
