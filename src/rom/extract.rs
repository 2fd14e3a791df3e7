// Turning user inputs into ROM files on disk.
//
// Plain files are copied, `.zip` archives are unpacked natively and
// `.7z`/`.rar` archives go through an external 7-Zip executable.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use walkdir::WalkDir;

use super::error::ExtractError;

/// Where 7-Zip usually lives when it is not on PATH.
const KNOWN_7Z_PATHS: &[&str] = &[
    r"C:\Program Files\7-Zip\7z.exe",
    r"C:\Program Files (x86)\7-Zip\7z.exe",
];

/// Source of ROM files for the sorter.
pub trait Extractor {
    /// Unpack `input` into the empty directory `scratch` and return every
    /// non-empty file produced.
    fn extract(&self, input: &Path, scratch: &Path) -> Result<Vec<PathBuf>, ExtractError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Plain,
    Zip,
    SevenZip,
}

impl InputKind {
    pub fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("zip") => InputKind::Zip,
            Some("7z") | Some("rar") => InputKind::SevenZip,
            _ => InputKind::Plain,
        }
    }
}

/// Extractor backed by the zip crate and an optional 7-Zip executable.
#[derive(Debug, Clone, Default)]
pub struct ArchiveExtractor {
    seven_zip: Option<PathBuf>,
}

impl ArchiveExtractor {
    pub fn new(seven_zip: Option<PathBuf>) -> Self {
        Self { seven_zip }
    }

    /// Find 7-Zip on PATH or at its default install location.
    pub fn locate() -> Self {
        Self::new(find_seven_zip())
    }

    pub fn seven_zip(&self) -> Option<&Path> {
        self.seven_zip.as_deref()
    }

    fn run_seven_zip(&self, input: &Path, scratch: &Path) -> Result<(), ExtractError> {
        let Some(tool) = &self.seven_zip else {
            return Err(ExtractError::MissingTool {
                input: input.to_path_buf(),
            });
        };

        let mut out_arg = std::ffi::OsString::from("-o");
        out_arg.push(scratch);
        let output = Command::new(tool)
            .arg("x")
            .arg(input)
            .arg(out_arg)
            .arg("-y")
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            log::debug!("7-Zip stderr: {}", String::from_utf8_lossy(&output.stderr).trim());
            return Err(ExtractError::ToolFailed {
                input: input.to_path_buf(),
                status: output.status,
            });
        }
        Ok(())
    }
}

impl Extractor for ArchiveExtractor {
    fn extract(&self, input: &Path, scratch: &Path) -> Result<Vec<PathBuf>, ExtractError> {
        match InputKind::of(input) {
            InputKind::Zip => {
                let mut archive = zip::ZipArchive::new(File::open(input)?)?;
                archive.extract(scratch)?;
            }
            InputKind::SevenZip => self.run_seven_zip(input, scratch)?,
            InputKind::Plain => {
                let name = input.file_name().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "input has no file name")
                })?;
                fs::copy(input, scratch.join(name))?;
            }
        }
        collect_files(scratch)
    }
}

fn find_seven_zip() -> Option<PathBuf> {
    if let Ok(path) = which::which("7z") {
        return Some(path);
    }
    KNOWN_7Z_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Every non-empty regular file under `dir`, in file-name order.
fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && entry.metadata()?.len() > 0 {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
