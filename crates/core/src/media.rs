//! Upload validation and MIME helpers.

use crate::error::CoreError;

/// Content types accepted for selfie and custom-style uploads.
pub const ALLOWED_IMAGE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Validate an uploaded image's declared content type and size.
pub fn validate_upload(
    content_type: Option<&str>,
    size_bytes: usize,
    max_size_bytes: usize,
) -> Result<(), CoreError> {
    let Some(content_type) = content_type else {
        return Err(CoreError::Validation("No image was provided.".into()));
    };
    if !ALLOWED_IMAGE_CONTENT_TYPES.contains(&content_type) {
        return Err(CoreError::Validation(
            "Unsupported image format. Use JPEG, PNG, or WEBP.".into(),
        ));
    }
    if size_bytes > max_size_bytes {
        let max_mb = max_size_bytes / (1024 * 1024);
        return Err(CoreError::Validation(format!(
            "Image is too large. Maximum allowed size is {max_mb} MB."
        )));
    }
    Ok(())
}

/// Guess a MIME type from a file path's extension. Defaults to JPEG,
/// which is what phone cameras overwhelmingly produce.
pub fn guess_mime_type(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "image/jpeg",
    }
}

/// Map a MIME type to the file extension used when storing results.
pub fn extension_from_mime(mime_type: &str) -> &'static str {
    match mime_type.split(';').next().unwrap_or("").trim() {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const MAX: usize = 6 * 1024 * 1024;

    #[test]
    fn accepts_allowed_types_within_limit() {
        for ct in ALLOWED_IMAGE_CONTENT_TYPES {
            assert!(validate_upload(Some(ct), 1024, MAX).is_ok());
        }
    }

    #[test]
    fn rejects_missing_and_unsupported_types() {
        assert_matches!(
            validate_upload(None, 1024, MAX),
            Err(CoreError::Validation(msg)) if msg.contains("No image")
        );
        assert_matches!(
            validate_upload(Some("image/gif"), 1024, MAX),
            Err(CoreError::Validation(msg)) if msg.contains("Unsupported")
        );
        assert_matches!(
            validate_upload(Some("text/plain"), 1024, MAX),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_oversized_uploads_with_mb_hint() {
        assert_matches!(
            validate_upload(Some("image/jpeg"), MAX + 1, MAX),
            Err(CoreError::Validation(msg)) if msg.contains("6 MB")
        );
        // Exactly at the limit is fine.
        assert!(validate_upload(Some("image/jpeg"), MAX, MAX).is_ok());
    }

    #[test]
    fn mime_guessing_and_extension_mapping() {
        assert_eq!(guess_mime_type("a/b/selfie.PNG"), "image/png");
        assert_eq!(guess_mime_type("ref.webp"), "image/webp");
        assert_eq!(guess_mime_type("photo.jpeg"), "image/jpeg");
        assert_eq!(guess_mime_type("noext"), "image/jpeg");

        assert_eq!(extension_from_mime("image/jpeg"), "jpg");
        assert_eq!(extension_from_mime("image/png; charset=binary"), "png");
        assert_eq!(extension_from_mime("application/octet-stream"), "png");
    }
}
