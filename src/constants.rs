pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

pub const DEFAULT_INPUT_DIR: &str = "./images";
pub const DEFAULT_OPTIMIZED_DIR: &str = "./images-optimized";
pub const DEFAULT_METADATA_DIR: &str = "./metadata";
pub const DEFAULT_WALLET_PATH: &str = "./wallet.json";

// Fixed optimization profile: fit within 2048x2048, never upscale, JPEG q92
pub const MAX_IMAGE_DIMENSION: u32 = 2048;
pub const JPEG_QUALITY: u8 = 92;

pub const DEFAULT_APP_NAME: &str = "ArweaveUploader";
pub const APP_VERSION_TAG: &str = "1.0.0";
pub const DEFAULT_CONTENT_TYPE: &str = "image/*";
pub const MAX_CONCURRENT_UPLOADS: usize = 5;

pub const WINC_PER_CREDIT: u128 = 1_000_000_000_000;

pub const DEFAULT_PAYMENT_SERVICE_URL: &str = "https://payment.ardrive.io";
pub const DEFAULT_UPLOAD_SERVICE_URL: &str = "https://upload.ardrive.io";
pub const ARWEAVE_GATEWAY_URL: &str = "https://arweave.net";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArkImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
}

impl ArkImageFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ArkImageFormat::Jpeg),
            "png" => Some(ArkImageFormat::Png),
            "webp" => Some(ArkImageFormat::WebP),
            "gif" => Some(ArkImageFormat::Gif),
            "bmp" => Some(ArkImageFormat::Bmp),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ArkImageFormat::Jpeg => "image/jpeg",
            ArkImageFormat::Png => "image/png",
            ArkImageFormat::WebP => "image/webp",
            ArkImageFormat::Gif => "image/gif",
            ArkImageFormat::Bmp => "image/bmp",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_case_insensitive() {
        assert_eq!(ArkImageFormat::from_extension("JPG"), Some(ArkImageFormat::Jpeg));
        assert_eq!(ArkImageFormat::from_extension("jpeg"), Some(ArkImageFormat::Jpeg));
        assert_eq!(ArkImageFormat::from_extension("PnG"), Some(ArkImageFormat::Png));
        assert_eq!(ArkImageFormat::from_extension("tiff"), None);
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(ArkImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ArkImageFormat::Gif.mime_type(), "image/gif");
    }
}
