use log::info;
use std::fs;
use std::path::Path;

use crate::coco::CocoFile;
use crate::error::{ConvertError, Result};

/// Write COCO data to `path`.
///
/// The document is serialized in memory before the file is created, so a
/// serialization failure leaves nothing behind.
pub fn write_coco_file(coco: &CocoFile, path: &Path, pretty: bool) -> Result<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(coco)?
    } else {
        serde_json::to_vec(coco)?
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| ConvertError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    fs::write(path, bytes).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("COCO data written to {}", path.display());
    Ok(())
}
