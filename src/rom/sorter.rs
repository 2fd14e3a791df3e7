// Batch sorting: extract every input, classify each ROM, then copy it into
// `<dest>/<label>/[<size>/]`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::bucket::{self, FileRecord};
use super::cart::RomImage;
use super::error::{ExtractError, SortError};
use super::extract::Extractor;
use super::map::{self, MapLabel};

/// Destination-side file operations.
pub trait Filesystem {
    /// Recursive and idempotent.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Overwrites `to` if it exists.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
}

impl<T: Filesystem + ?Sized> Filesystem for &T {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).copy(from, to)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::copy(from, to).map(|_| ())
    }
}

/// Logs what would happen without touching the destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunFilesystem;

impl Filesystem for DryRunFilesystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        log::info!("would create {}", path.display());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        log::info!("would copy {} -> {}", from.display(), to.display());
        Ok(())
    }
}

/// Progress notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortEvent {
    /// Sent once per batch, the first time a 7z/rar input cannot be opened.
    ToolMissing { message: String },
    InputSkipped { input: PathBuf, reason: String },
    /// Sent once per classified file; `copied` is false after `CopyFailed`.
    Processed {
        name: String,
        label: MapLabel,
        done: usize,
        total: usize,
        copied: bool,
    },
    CopyFailed { name: String, reason: String },
    Finished(SortSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSummary {
    pub per_label: BTreeMap<MapLabel, usize>,
    /// Distinct destination files written.
    pub placed: usize,
    /// Copies that replaced a file written earlier in the same batch.
    pub overwritten: usize,
    pub skipped_inputs: usize,
    pub failed_copies: usize,
}

pub struct Sorter<E, F> {
    extractor: E,
    fs: F,
}

impl<E: Extractor, F: Filesystem> Sorter<E, F> {
    pub fn new(extractor: E, fs: F) -> Self {
        Self { extractor, fs }
    }

    /// Sort `inputs` into `dest`. Only failing to create a destination or
    /// scratch directory aborts the batch; per-file problems are reported
    /// through `notify` and skipped.
    pub fn run(
        &self,
        inputs: &[PathBuf],
        dest: &Path,
        mut notify: impl FnMut(SortEvent),
    ) -> Result<SortSummary, SortError> {
        for label in MapLabel::ALL {
            self.ensure_dir(&dest.join(label.folder_name()))?;
        }

        let scratch = tempfile::Builder::new()
            .prefix("snes-sort-")
            .tempdir()
            .map_err(SortError::Scratch)?;

        let mut summary = SortSummary::default();
        let mut by_label: BTreeMap<MapLabel, Vec<FileRecord>> = BTreeMap::new();
        let mut tool_reported = false;

        for (i, input) in inputs.iter().enumerate() {
            let work = scratch.path().join(format!("{i:04}"));
            fs::create_dir(&work).map_err(SortError::Scratch)?;

            match self.extractor.extract(input, &work) {
                Ok(files) => {
                    log::debug!("{}: {} file(s)", input.display(), files.len());
                    for path in files {
                        let rec = classify_file(path);
                        by_label.entry(rec.label).or_default().push(rec);
                    }
                }
                Err(e) => {
                    log::warn!("skipping {}: {e}", input.display());
                    if matches!(e, ExtractError::MissingTool { .. }) && !tool_reported {
                        tool_reported = true;
                        notify(SortEvent::ToolMissing {
                            message: e.to_string(),
                        });
                    }
                    summary.skipped_inputs += 1;
                    notify(SortEvent::InputSkipped {
                        input: input.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let total: usize = by_label.values().map(Vec::len).sum();
        let mut created = BTreeSet::new();
        let mut written = BTreeSet::new();
        let mut done = 0;

        for (label, records) in &by_label {
            *summary.per_label.entry(*label).or_default() += records.len();
            let label_dir = dest.join(label.folder_name());

            for placement in bucket::plan(&label_dir, records) {
                if placement.size_folder.is_some() && created.insert(placement.folder.clone()) {
                    self.ensure_dir(&placement.folder)?;
                }

                let name = file_name(&placement.source);
                done += 1;
                let target = placement.folder.join(&name);
                let copied = match self.fs.copy(&placement.source, &target) {
                    Ok(()) if !written.insert(target.clone()) => {
                        log::warn!("{} overwritten by a later {name}", target.display());
                        summary.overwritten += 1;
                        true
                    }
                    Ok(()) => {
                        log::info!("{name} -> {}", placement.folder.display());
                        summary.placed += 1;
                        true
                    }
                    Err(e) => {
                        log::warn!("failed to copy {name}: {e}");
                        summary.failed_copies += 1;
                        notify(SortEvent::CopyFailed {
                            name: name.clone(),
                            reason: e.to_string(),
                        });
                        false
                    }
                };
                notify(SortEvent::Processed {
                    name,
                    label: *label,
                    done,
                    total,
                    copied,
                });
            }
        }

        log::info!(
            "sorted {} file(s), {} overwritten, {} input(s) skipped, {} copy failure(s)",
            summary.placed,
            summary.overwritten,
            summary.skipped_inputs,
            summary.failed_copies
        );
        notify(SortEvent::Finished(summary.clone()));
        Ok(summary)
    }

    fn ensure_dir(&self, path: &Path) -> Result<(), SortError> {
        self.fs
            .create_dir_all(path)
            .map_err(|source| SortError::Destination {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Read and classify one extracted file. Unreadable files become Unknown.
fn classify_file(path: PathBuf) -> FileRecord {
    match RomImage::load(&path) {
        Ok(rom) => FileRecord {
            label: map::classify(&rom),
            len: rom.len() as u64,
            path,
        },
        Err(e) => {
            log::warn!("{e:#}; sorting as {}", MapLabel::Unknown);
            let len = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            FileRecord {
                path,
                label: MapLabel::Unknown,
                len,
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
