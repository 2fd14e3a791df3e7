// ROM classification and sorting
mod bucket;
mod cart;
mod error;
mod extract;
mod header;
mod map;
mod sorter;

pub use cart::RomImage;
pub use extract::ArchiveExtractor;
pub use header::LayoutScores;
pub use map::resolve;
pub use sorter::{DryRunFilesystem, SortEvent, Sorter, StdFilesystem};
