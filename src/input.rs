// ABOUTME: Loads the wireframe image from disk and builds the job request
// ABOUTME: MIME type is inferred from the file extension before any upload

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::error::ConverterError;
use crate::remote::models::JobRequest;

/// Upload types the workflow accepts.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

pub fn load_wireframe(path: &Path, user_prompt: String) -> Result<JobRequest> {
    let image_mime_type = mime_for_path(path)?.to_string();

    let image_bytes = fs::read(path)
        .with_context(|| format!("Failed to read wireframe image {}", path.display()))?;
    if image_bytes.is_empty() {
        return Err(ConverterError::Input(format!("{} is empty", path.display())).into());
    }

    let image_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wireframe".to_string());

    Ok(JobRequest {
        image_bytes,
        image_name,
        image_mime_type,
        user_prompt,
    })
}

fn mime_for_path(path: &Path) -> Result<&'static str, ConverterError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    ACCEPTED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| {
            ConverterError::UnsupportedImage(format!(
                "{}: expected png, jpg, jpeg, gif, or webp",
                path.display()
            ))
        })
}
