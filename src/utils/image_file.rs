use crate::error::ClientError;
use image::RgbaImage;
use std::path::Path;

/// Extensions the processing service accepts for upload.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

pub fn is_allowed_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, ClientError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

pub fn guess_mime(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    use image::{DynamicImage, ImageFormat, Rgba};
    use std::io::Cursor;

    let img = RgbaImage::from_pixel(width, height, Rgba([255, 180, 0, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png fixture");
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_allowed_image(Path::new("smile.PNG")));
        assert!(is_allowed_image(Path::new("dir/photo.jpeg")));
        assert!(is_allowed_image(Path::new("party.gif")));
    }

    #[test]
    fn rejects_other_or_missing_extensions() {
        assert!(!is_allowed_image(Path::new("notes.txt")));
        assert!(!is_allowed_image(Path::new("vector.svg")));
        assert!(!is_allowed_image(Path::new("README")));
    }

    #[test]
    fn decodes_to_natural_dimensions() {
        let decoded = decode_rgba(&png_fixture(7, 3)).expect("decode");
        assert_eq!(decoded.dimensions(), (7, 3));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_rgba(b"definitely not an image").expect_err("must fail");
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(guess_mime("a.png"), "image/png");
        assert_eq!(guess_mime("a.jpg"), "image/jpeg");
        assert_eq!(guess_mime("a.unknown"), "application/octet-stream");
    }
}
