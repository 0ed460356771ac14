//! Asset staging
//!
//! Copies bundled assets into the local data directory: language data files
//! go into the `tessdata` subdirectory, everything else into the root.
//! Existing files are never overwritten.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::engine::{TESSDATA_DIR, TRAINEDDATA_EXT};

/// Errors that abort asset staging
#[derive(Debug, Error)]
pub enum AssetError {
    /// A target directory could not be created
    #[error("can't create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The asset directory could not be listed
    #[error("can't list assets in {path:?}: {source}")]
    ListAssets {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn ensure_dir(path: &Path) -> Result<(), AssetError> {
    std::fs::create_dir_all(path).map_err(|source| AssetError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn is_traineddata(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(TRAINEDDATA_EXT)
}

/// Stage every file in `assets_dir` into `local_dir`.
///
/// Returns the number of files copied. A single failed copy is logged and
/// skipped; failing to create the target directories is an error.
pub fn extract_assets(assets_dir: &Path, local_dir: &Path) -> Result<usize, AssetError> {
    ensure_dir(local_dir)?;
    let tess_dir = local_dir.join(TESSDATA_DIR);
    ensure_dir(&tess_dir)?;

    let entries = std::fs::read_dir(assets_dir).map_err(|source| AssetError::ListAssets {
        path: assets_dir.to_path_buf(),
        source,
    })?;

    let mut copied = 0;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable asset entry: {}", e);
                continue;
            }
        };
        let source = entry.path();
        if !source.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let target = if is_traineddata(&source) {
            tess_dir.join(&file_name)
        } else {
            local_dir.join(&file_name)
        };

        if target.exists() {
            debug!("Asset {:?} already present", target);
            continue;
        }

        match std::fs::copy(&source, &target) {
            Ok(_) => copied += 1,
            Err(e) => warn!("Failed to copy asset {:?} to {:?}: {}", source, target, e),
        }
    }

    info!(copied, "Assets extracted to {:?}", local_dir);
    Ok(copied)
}
