//! MIME sniffing and `data:` URI helpers.

use crate::{Error, Result};

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to {}",
                &bytes[..bytes.len().min(4)],
                DEFAULT_IMAGE_MIME
            );
            DEFAULT_IMAGE_MIME
        }
    }
}

/// `data:{mime};base64,{data}`. `data` must already be base64.
pub fn to_data_uri(mime_type: &str, data: &str) -> String {
    format!("data:{};base64,{}", mime_type, data)
}

/// Splits a base64 `data:` URI into its MIME type and payload.
pub fn parse_data_uri(uri: &str) -> Result<(&str, &str)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::DataUri("missing 'data:' scheme".to_string()))?;
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| Error::DataUri("missing ',' separator".to_string()))?;
    let mime_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| Error::DataUri("only base64 payloads are supported".to_string()))?;

    Ok((mime_type, data))
}

/// File extension (without the dot) for a MIME type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    // Strip parameters such as `audio/L16;codec=pcm;rate=24000`.
    let essence = mime_type.split(';').next().unwrap_or("").trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/mpeg" => "mp3",
        "audio/l16" | "audio/pcm" => "pcm",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        assert_eq!(
            detect_image_mime(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            "image/png"
        );
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(detect_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    }

    #[test]
    fn test_detect_webp() {
        assert_eq!(
            detect_image_mime(&[
                0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50
            ]),
            "image/webp"
        );
    }

    #[test]
    fn test_unknown_falls_back_to_png() {
        assert_eq!(detect_image_mime(&[0x00, 0x01, 0x02, 0x03]), "image/png");
        assert_eq!(detect_image_mime(&[]), "image/png");
    }

    #[test]
    fn test_to_data_uri() {
        assert_eq!(
            to_data_uri("image/jpeg", "AAAA"),
            "data:image/jpeg;base64,AAAA"
        );
    }

    #[test]
    fn test_parse_data_uri() {
        assert_eq!(
            parse_data_uri("data:image/jpeg;base64,AAAA").unwrap(),
            ("image/jpeg", "AAAA")
        );
    }

    #[test]
    fn test_parse_data_uri_rejects_malformed_input() {
        assert!(matches!(parse_data_uri("AAAA"), Err(Error::DataUri(_))));
        assert!(matches!(
            parse_data_uri("data:image/png;base64"),
            Err(Error::DataUri(_))
        ));
        assert!(matches!(
            parse_data_uri("data:text/plain,hello"),
            Err(Error::DataUri(_))
        ));
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("IMAGE/PNG"), "png");
        assert_eq!(extension_for_mime("audio/L16;codec=pcm;rate=24000"), "pcm");
        assert_eq!(extension_for_mime("application/octet-stream"), "bin");
    }
}
