use std::path::{Component, Path};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetNameError {
    #[error("asset name must not be empty")]
    Empty,
    #[error("asset name must be relative to the asset root")]
    NotRelative,
    #[error("asset name must not contain '..'")]
    ParentTraversal,
}

pub(crate) fn validate_asset_name(name: &str) -> Result<(), AssetNameError> {
    if name.is_empty() {
        return Err(AssetNameError::Empty);
    }
    Ok(())
}

/// Keeps filesystem reads inside the asset root.
pub(crate) fn relative_asset_path(name: &str) -> Result<&Path, AssetNameError> {
    validate_asset_name(name)?;
    let path = Path::new(name);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(AssetNameError::ParentTraversal),
            Component::RootDir | Component::Prefix(_) => return Err(AssetNameError::NotRelative),
        }
    }
    Ok(path)
}
