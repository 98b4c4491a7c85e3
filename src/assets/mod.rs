//! # Assets
//!
//! Loading and decoding of the files the scene is dressed with: a typeface
//! for the text, a matcap texture for shading and an HDR environment map.
//! Loads run on worker threads; see [`loader`].

pub mod font;
pub mod image;
pub mod loader;

pub use font::Typeface;
pub use self::image::{decode_environment, decode_matcap, DecodedImage};
pub use loader::{AssetLoader, PendingAsset};
