//! Album cover link construction
//!
//! Builds CDN links only; reachability is never checked.

use crate::{Error, Result};

const COVER_URL_PREFIX: &str = "https://y.gtimg.cn/music/photo_new/T002R";

/// Sizes the cover CDN serves, in pixels per side
pub const SUPPORTED_COVER_SIZES: [u32; 4] = [150, 300, 500, 800];

/// Check a configured cover size (0 disables covers)
pub fn validate_cover_size(size: u32) -> Result<()> {
    if size == 0 || SUPPORTED_COVER_SIZES.contains(&size) {
        Ok(())
    } else {
        Err(Error::InvalidSize(size))
    }
}

/// Build the square cover link for an album
///
/// Returns `Ok(None)` when `size` is 0.
pub fn cover_url(album_mid: &str, size: u32) -> Result<Option<String>> {
    validate_cover_size(size)?;
    if size == 0 {
        return Ok(None);
    }
    Ok(Some(format!(
        "{COVER_URL_PREFIX}{size}x{size}M000{album_mid}.jpg"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_disables_cover() {
        assert_eq!(cover_url("003rytri2FHG3V", 0).unwrap(), None);
        assert_eq!(cover_url("", 0).unwrap(), None);
    }

    #[test]
    fn test_supported_sizes() {
        for size in SUPPORTED_COVER_SIZES {
            let url = cover_url("003rytri2FHG3V", size).unwrap().unwrap();
            assert!(url.contains(&format!("R{size}x{size}M000")));
            assert!(url.ends_with("003rytri2FHG3V.jpg"));
        }
    }

    #[test]
    fn test_exact_link() {
        assert_eq!(
            cover_url("abc", 300).unwrap().as_deref(),
            Some("https://y.gtimg.cn/music/photo_new/T002R300x300M000abc.jpg")
        );
    }

    #[test]
    fn test_unsupported_size() {
        for size in [1, 100, 149, 640, 1000] {
            assert!(matches!(cover_url("abc", size), Err(Error::InvalidSize(s)) if s == size));
        }
    }
}
