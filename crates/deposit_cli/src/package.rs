use std::fs;
use std::path::Path;

use deposit_engine::{DepositError, PackagedPayload, ZIP_CONTENT_TYPE};

/// Local file header signature that starts every non-empty zip archive.
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Loads an already zipped bag. Directories are not packaged here.
pub fn stage_zip(path: &Path, filename: &str) -> Result<PackagedPayload, DepositError> {
    let metadata = fs::metadata(path).map_err(|err| {
        DepositError::InvalidPackage(format!("cannot access {}: {err}", path.display()))
    })?;
    if metadata.is_dir() {
        return Err(DepositError::InvalidPackage(format!(
            "{} is a directory; zip the bag first",
            path.display()
        )));
    }

    let bytes = fs::read(path).map_err(|err| {
        DepositError::InvalidPackage(format!("cannot read {}: {err}", path.display()))
    })?;
    if !bytes.starts_with(ZIP_SIGNATURE) {
        return Err(DepositError::InvalidPackage(format!(
            "{} is not a valid zip file",
            path.display()
        )));
    }

    Ok(PackagedPayload::from_bytes(bytes, ZIP_CONTENT_TYPE, filename))
}
