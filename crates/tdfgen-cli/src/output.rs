//! Atomic write of the generated artifact.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::debug;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Name of the artifact inside the output directory.
pub const DECODERS_FILE: &str = "decoders.rs";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output directory {}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write temporary file in {}", dir.display())]
    Write { dir: PathBuf, source: io::Error },
    #[error("failed to move generated file into {}", path.display())]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

/// Writes `source` to `dir/decoders.rs`, creating `dir` if needed.
///
/// The file is written to a temporary file in `dir` and renamed into place,
/// so an existing artifact is either fully replaced or left untouched.
pub fn write_decoders(dir: &Path, source: &str) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let write_err = |source: io::Error| OutputError::Write {
        dir: dir.to_path_buf(),
        source,
    };
    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(source.as_bytes()).map_err(write_err)?;
    file.as_file().sync_all().map_err(write_err)?;

    let path = dir.join(DECODERS_FILE);
    debug!("persisting {} to {}", file.path().display(), path.display());
    file.persist(&path).map_err(|source| OutputError::Persist {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_decoders() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_decoders(dir.path(), "pub fn a() {}\n").unwrap();

        assert_eq!(path, dir.path().join(DECODERS_FILE));
        assert_eq!(fs::read_to_string(&path).unwrap(), "pub fn a() {}\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DECODERS_FILE), "old").unwrap();

        write_decoders(dir.path(), "new").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join(DECODERS_FILE)).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("gen").join("tdf");

        let path = write_decoders(&nested, "").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_output_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        assert!(matches!(
            write_decoders(&blocker, ""),
            Err(OutputError::CreateDir { .. })
        ));
    }
}
