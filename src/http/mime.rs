//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

use std::path::Path;

/// Fallback for unknown or missing extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Get MIME Content-Type for a path based on its extension
///
/// # Examples
/// ```
/// use rangeserve::http::mime::get_content_type;
/// use std::path::Path;
///
/// assert_eq!(get_content_type(Path::new("/videos/clip.mp4")), "video/mp4");
/// assert_eq!(get_content_type(Path::new("/videos/README")), "application/octet-stream");
/// ```
pub fn get_content_type(path: &Path) -> &'static str {
    mime_guess::from_path(path).first_raw().unwrap_or(OCTET_STREAM)
}
