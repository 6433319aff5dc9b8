use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

const PNG_SIGNATURE: &[u8] = b"\x89PNG";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("image has zero size")]
    Empty,

    #[error("pixel buffer holds {actual} bytes, {expected} expected for RGBA")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// RGBA8 bitmap handed from the capture surface to the OCR engine
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl std::fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl CapturedImage {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::Empty);
        }

        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ImageError::SizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }

        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Decode an encoded image (PNG, BMP, ...).
    ///
    /// Some capture tools prefix their output with noise. When the payload
    /// does not decode but carries a PNG signature further in, decoding is
    /// retried from that offset.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        match Self::decode_exact(bytes) {
            Ok(image) => Ok(image),
            Err(err) => {
                let offset = find_png_signature(bytes).filter(|&idx| idx > 0);
                let Some(offset) = offset else {
                    return Err(err);
                };

                tracing::debug!("Found PNG signature at offset {}, retrying decode", offset);
                Self::decode_exact(&bytes[offset..])
            }
        }
    }

    fn decode_exact(bytes: &[u8]) -> Result<Self, ImageError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, ImageError> {
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(
                &self.rgba,
                self.width,
                self.height,
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(buffer)
    }

    pub fn to_dynamic_image(&self) -> Result<DynamicImage, ImageError> {
        let expected = self.width as usize * self.height as usize * 4;
        RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .map(DynamicImage::ImageRgba8)
            .ok_or(ImageError::SizeMismatch {
                expected,
                actual: self.rgba.len(),
            })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }
}

fn find_png_signature(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(PNG_SIGNATURE.len())
        .position(|window| window == PNG_SIGNATURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> CapturedImage {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 0 } else { 255 };
                rgba.extend_from_slice(&[v, v, v, 255]);
            }
        }
        CapturedImage::from_rgba(width, height, rgba).unwrap()
    }

    #[test]
    fn test_from_rgba_validates_size() {
        assert_eq!(
            CapturedImage::from_rgba(0, 10, vec![]),
            Err(ImageError::Empty)
        );
        assert_eq!(
            CapturedImage::from_rgba(2, 2, vec![0; 15]),
            Err(ImageError::SizeMismatch {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_png_decode_matches_pixels() {
        let image = checker(5, 3);
        let png = image.encode_png().unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));

        let decoded = CapturedImage::decode(&png).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_dynamic_image_keeps_pixels() {
        let image = checker(3, 2);
        let dynamic = image.to_dynamic_image().unwrap();
        assert_eq!(dynamic.width(), 3);
        assert_eq!(dynamic.height(), 2);
        assert_eq!(dynamic.to_rgba8().into_raw(), image.as_rgba());
    }

    #[test]
    fn test_decode_salvages_prefixed_png() {
        let image = checker(4, 4);
        let mut payload = b"grim: warning\n".to_vec();
        payload.extend(image.encode_png().unwrap());

        let decoded = CapturedImage::decode(&payload).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 4);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = CapturedImage::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));

        // a signature followed by junk still fails cleanly
        let err = CapturedImage::decode(b"xx\x89PNGjunk").unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }
}
