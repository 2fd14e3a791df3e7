// size bucketing within one map label
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::map::MapLabel;

/// One classified file waiting to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub label: MapLabel,
    pub len: u64,
}

/// Where one file should be copied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub source: PathBuf,
    pub folder: PathBuf,
    /// Set when the file shares its exact length with another file.
    pub size_folder: Option<String>,
}

/// Human-readable size used as a folder name: "1MB", "1.5MB", "512KB".
/// Anything under a kilobyte is "1KB".
pub fn size_label(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1.0 {
        if mb.fract() == 0.0 {
            format!("{}MB", mb as u64)
        } else {
            format!("{mb:.1}MB")
        }
    } else if kb >= 1.0 {
        format!("{}KB", kb as u64)
    } else {
        "1KB".to_string()
    }
}

/// Group records by exact byte length, smallest first. Records keep their
/// original order inside a group.
pub fn group_by_size(records: &[FileRecord]) -> BTreeMap<u64, Vec<&FileRecord>> {
    let mut groups: BTreeMap<u64, Vec<&FileRecord>> = BTreeMap::new();
    for rec in records {
        groups.entry(rec.len).or_default().push(rec);
    }
    groups
}

/// Placements for every record of one label under `label_dir`.
pub fn plan(label_dir: &Path, records: &[FileRecord]) -> Vec<Placement> {
    let mut out = Vec::with_capacity(records.len());
    for (len, group) in group_by_size(records) {
        let size_folder = (group.len() > 1).then(|| size_label(len));
        let folder = match &size_folder {
            Some(name) => label_dir.join(name),
            None => label_dir.to_path_buf(),
        };
        for rec in group {
            out.push(Placement {
                source: rec.path.clone(),
                folder: folder.clone(),
                size_folder: size_folder.clone(),
            });
        }
    }
    out
}
