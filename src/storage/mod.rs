//! Storage Layer
//!
//! Locates the application's data and configuration directories and stages
//! language data and sample files into them.

pub mod assets;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use assets::{extract_assets, AssetError};

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "ocrjobctl", "OcrJobCtl")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Directory handed to the engine as its data path.
///
/// The engine looks for `tessdata/*.traineddata` below this directory.
pub fn tess_data_path(local_dir: &Path) -> PathBuf {
    local_dir.to_path_buf()
}

/// Location of the sample image inside the local directory
pub fn image_file(local_dir: &Path, image_name: &str) -> PathBuf {
    local_dir.join(image_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_local_dir() {
        let local = Path::new("/data/app");
        assert_eq!(tess_data_path(local), PathBuf::from("/data/app"));
        assert_eq!(image_file(local, "sample.jpg"), PathBuf::from("/data/app/sample.jpg"));
    }
}
