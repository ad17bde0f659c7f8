//! Provisioning of the binary ephemeris dataset.
//!
//! The reduction chain expects the development-ephemeris file in the user's
//! local data directory. [`ensure_dataset`] installs it there from a source
//! file the first time, and leaves an already-installed copy untouched so a
//! newer dataset dropped in place by the user survives upgrades.

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use log::{debug, info};

use crate::skypos_errors::SkyposError;

/// Directory where the ephemeris dataset is installed.
pub fn dataset_dir() -> Result<Utf8PathBuf, SkyposError> {
    let base_dirs = BaseDirs::new().ok_or_else(|| {
        SkyposError::UnableToCreateBaseDir(
            "could not determine the user data directory".to_string(),
        )
    })?;

    let data_dir = base_dirs.data_local_dir().join("skypos");
    Utf8PathBuf::from_path_buf(data_dir)
        .map_err(|p| SkyposError::Utf8PathError(p.display().to_string()))
}

/// Expected installed path of a dataset, whether or not it exists yet.
pub fn dataset_path(file_name: &str) -> Result<Utf8PathBuf, SkyposError> {
    Ok(dataset_dir()?.join(file_name))
}

/// Install an ephemeris dataset into the local data directory if absent.
///
/// Arguments
/// ---------
/// * `source`: path of the dataset file to install from
/// * `file_name`: name of the installed file (e.g. `"JPLEPH.440"`)
///
/// Return
/// ------
/// * The installed path. An existing installed file is kept as-is; the
///   source is only read when a copy is actually needed.
pub fn ensure_dataset(source: &Utf8Path, file_name: &str) -> Result<Utf8PathBuf, SkyposError> {
    let dest = dataset_path(file_name)?;

    if dest.exists() {
        debug!("ephemeris dataset already installed at {dest}");
        return Ok(dest);
    }

    if !source.exists() {
        return Err(SkyposError::DatasetNotFound(source.to_string()));
    }

    let dir = dataset_dir()?;
    std::fs::create_dir_all(&dir)
        .map_err(|e| SkyposError::UnableToCreateBaseDir(format!("{dir}: {e}")))?;

    std::fs::copy(source, &dest)?;
    info!("installed ephemeris dataset {source} -> {dest}");

    Ok(dest)
}
