mod loader;
mod names;
mod sprite;

pub use loader::{AssetError, AssetLoader, AssetSource, FsAssetSource, LoadSummary, LoaderError};
pub use names::AssetNameError;
pub use sprite::Sprite;
