//! File system utilities for output collection
//!
//! Thin wrappers over `std::fs` that attach the operation and path to every
//! IO error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A failed filesystem operation
#[derive(Error, Debug)]
#[error("{message} {}: {source}", path.display())]
pub struct FsError {
    pub message: String,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

pub type FsResult<T> = Result<T, FsError>;

/// Extension trait for converting IO errors to filesystem errors
pub trait IntoFsError<T> {
    fn fs_context(self, message: &str, path: &Path) -> FsResult<T>;
}

impl<T> IntoFsError<T> for Result<T, io::Error> {
    fn fs_context(self, message: &str, path: &Path) -> FsResult<T> {
        self.map_err(|source| FsError {
            message: message.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Create a directory and all parent directories if they don't exist
pub fn create_dir_all<P: AsRef<Path>>(path: P) -> FsResult<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).fs_context("Failed to create directory", path)
}

/// Whether both paths resolve to the same existing file
pub fn is_same_file<P: AsRef<Path>, Q: AsRef<Path>>(a: P, b: Q) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy a file from source to destination, replacing the destination
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> FsResult<u64> {
    let from = from.as_ref();
    let to = to.as_ref();

    fs::copy(from, to).fs_context(&format!("Failed to copy {} to", from.display()), to)
}

/// Move a file, copying and removing the source when a rename is not
/// possible (e.g. across filesystems)
pub fn move_file<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> FsResult<()> {
    let from = from.as_ref();
    let to = to.as_ref();

    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    copy_file(from, to)?;
    fs::remove_file(from).fs_context("Failed to remove moved file", from)
}
