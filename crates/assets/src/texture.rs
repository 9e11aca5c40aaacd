use crate::AssetError;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Content-addressed texture id computed from the encoded file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

impl TextureId {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        Self(u64::from_le_bytes(head))
    }
}

/// Decoded RGBA8 image data.
#[derive(Debug, Clone)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Texture {
    pub fn decode(bytes: &[u8]) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self {
            id: TextureId::of_bytes(bytes),
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        })
    }
}

/// Handle returned by texture loads. Always valid to hold; the texture itself
/// is absent when the load failed.
#[derive(Debug, Clone, Default)]
pub struct TextureHandle {
    url: Arc<str>,
    texture: Option<Arc<Texture>>,
}

impl TextureHandle {
    pub fn ready(url: &str, texture: Arc<Texture>) -> Self {
        Self {
            url: url.into(),
            texture: Some(texture),
        }
    }

    pub fn failed(url: &str) -> Self {
        Self {
            url: url.into(),
            texture: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.texture.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_id_is_content_addressed() {
        assert_eq!(TextureId::of_bytes(b"abc"), TextureId::of_bytes(b"abc"));
        assert_ne!(TextureId::of_bytes(b"abc"), TextureId::of_bytes(b"abd"));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            Texture::decode(b"definitely not a png"),
            Err(AssetError::Image(_))
        ));
    }

    #[test]
    fn failed_handle_has_no_texture() {
        let handle = TextureHandle::failed("missing.png");
        assert!(!handle.is_ready());
        assert_eq!(handle.url(), "missing.png");
    }
}
