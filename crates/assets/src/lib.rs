//! Asset loading: matcap textures and typeface fonts.
//!
//! Every asset is loaded once and shared by `Arc` for the process lifetime.
//! Consumers hold handles, never raw file data.
//!
//! # Invariants
//! - A load failure is reported through the observer and never aborts the caller.
//! - A font request leaves `Pending` exactly once.
//! - Observer callbacks run on the thread that owns the [`AssetLoader`].

mod font;
mod loader;
mod request;
mod texture;

pub use font::{Font, Glyph, OutlineCommand};
pub use loader::{AssetLoader, LoadObserver, LoadingProgress, LogObserver};
pub use request::{AssetRequest, AssetState};
pub use texture::{Texture, TextureHandle, TextureId};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("typeface parse error: {0}")]
    FontParse(String),
    #[error("font defines no glyphs")]
    MissingGlyphs,
    #[error("loader thread exited before delivering {0}")]
    Disconnected(String),
}

impl From<serde_json::Error> for AssetError {
    fn from(e: serde_json::Error) -> Self {
        Self::FontParse(e.to_string())
    }
}
