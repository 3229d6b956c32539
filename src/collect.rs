//! Collection of workflow output files into a local directory.
//!
//! Missing sources are reported and skipped, since a partially failed run
//! should still be inspectable. A destination file that already exists stops
//! collection unless overwriting was requested; a source that already is the
//! destination file is left untouched. Nothing is rolled back: files
//! placed before a failure stay where they are, and the error carries the
//! report up to that point.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fs_utils::{self, FsError};
use crate::outputs::WorkflowOutputs;

/// Whether sources are left in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectMode {
    #[default]
    Copy,
    Move,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOptions {
    /// Place each output under `<destination>/<output name>`
    pub per_task_dir: bool,
    pub mode: CollectMode,
    /// Replace files that already exist in the destination
    pub overwrite: bool,
    /// Treat a missing source as fatal
    pub strict: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            per_task_dir: true,
            mode: CollectMode::Copy,
            overwrite: false,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedFile {
    pub task: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingFile {
    pub task: String,
    pub path: PathBuf,
}

/// What collection did, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectReport {
    pub collected: Vec<CollectedFile>,
    pub missing: Vec<MissingFile>,
    /// Outputs that are not file paths
    pub skipped: Vec<String>,
}

/// Collection stopped; `report` shows how far it got.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("File already exists: {}", path.display())]
    DestinationExists {
        path: PathBuf,
        report: Box<CollectReport>,
    },

    #[error("File not found: {}", path.display())]
    SourceNotFound {
        path: PathBuf,
        report: Box<CollectReport>,
    },

    #[error("Output path has no file name: {}", path.display())]
    NoFileName {
        path: PathBuf,
        report: Box<CollectReport>,
    },

    #[error("{source}")]
    Io {
        source: FsError,
        report: Box<CollectReport>,
    },
}

impl CollectError {
    pub fn report(&self) -> &CollectReport {
        match self {
            CollectError::DestinationExists { report, .. }
            | CollectError::SourceNotFound { report, .. }
            | CollectError::NoFileName { report, .. }
            | CollectError::Io { report, .. } => report,
        }
    }
}

/// Copy or move every file of `outputs` into `destination`.
pub fn collect(
    outputs: &WorkflowOutputs,
    destination: &Path,
    options: &CollectOptions,
) -> Result<CollectReport, CollectError> {
    let mut collector = Collector {
        options,
        report: CollectReport::default(),
    };
    collector.run(outputs, destination)?;
    Ok(collector.report)
}

struct Collector<'a> {
    options: &'a CollectOptions,
    report: CollectReport,
}

impl Collector<'_> {
    fn run(&mut self, outputs: &WorkflowOutputs, destination: &Path) -> Result<(), CollectError> {
        self.fs(fs_utils::create_dir_all(destination))?;

        for (task, value) in outputs.iter() {
            if !value.is_paths() {
                debug!(task = %task, "skipping output that is not a file path");
                self.report.skipped.push(task.clone());
                continue;
            }

            let task_dir = if self.options.per_task_dir {
                destination.join(task)
            } else {
                destination.to_path_buf()
            };
            self.fs(fs_utils::create_dir_all(&task_dir))?;

            for path in value.paths() {
                self.place(task, Path::new(path), &task_dir)?;
            }
        }

        Ok(())
    }

    fn place(&mut self, task: &str, source: &Path, task_dir: &Path) -> Result<(), CollectError> {
        if !source.exists() {
            if self.options.strict {
                return Err(CollectError::SourceNotFound {
                    path: source.to_path_buf(),
                    report: self.snapshot(),
                });
            }
            warn!("File not found: {}", source.display());
            self.report.missing.push(MissingFile {
                task: task.to_string(),
                path: source.to_path_buf(),
            });
            return Ok(());
        }

        let Some(file_name) = source.file_name() else {
            return Err(CollectError::NoFileName {
                path: source.to_path_buf(),
                report: self.snapshot(),
            });
        };

        let target = task_dir.join(file_name);
        // Copying a file onto itself would truncate it
        if fs_utils::is_same_file(source, &target) {
            debug!("{} is already in place", source.display());
            self.report.collected.push(CollectedFile {
                task: task.to_string(),
                source: source.to_path_buf(),
                destination: target,
            });
            return Ok(());
        }
        if target.exists() && !self.options.overwrite {
            return Err(CollectError::DestinationExists {
                path: target,
                report: self.snapshot(),
            });
        }

        match self.options.mode {
            CollectMode::Copy => self.fs(fs_utils::copy_file(source, &target).map(|_| ()))?,
            CollectMode::Move => self.fs(fs_utils::move_file(source, &target))?,
        }

        info!("{} -> {}", source.display(), target.display());
        self.report.collected.push(CollectedFile {
            task: task.to_string(),
            source: source.to_path_buf(),
            destination: target,
        });
        Ok(())
    }

    fn fs<T>(&self, result: Result<T, FsError>) -> Result<T, CollectError> {
        result.map_err(|source| CollectError::Io {
            source,
            report: self.snapshot(),
        })
    }

    fn snapshot(&self) -> Box<CollectReport> {
        Box::new(self.report.clone())
    }
}
