//! Random upload-name generation.
//!
//! The upload directory is shared by all concurrent requests. Names are
//! UUIDv4-based so write collisions are structurally avoided rather than
//! locked against.

/// Extensions we keep from the original filename. Anything else falls back
/// to `png`, which is what the generation service emits anyway.
const KNOWN_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Generate a random, collision-free name for an uploaded file.
///
/// The stem is a UUIDv4; the extension is taken from `original` when it is
/// one of the known image extensions (lowercased), otherwise `png`.
///
/// # Examples
///
/// ```
/// use fotomat_core::naming::random_upload_name;
///
/// let name = random_upload_name("holiday photo.JPG");
/// assert!(name.ends_with(".jpg"));
/// assert_eq!(name.len(), 36 + 4);
/// ```
pub fn random_upload_name(original: &str) -> String {
    let ext = original
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| KNOWN_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or_else(|| "png".to_string());

    format!("{}.{ext}", uuid::Uuid::new_v4())
}
