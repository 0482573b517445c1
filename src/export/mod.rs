pub mod archive;
pub mod report;
pub mod tree_copier;

pub use archive::archive_directory;
pub use report::{ExportManager, ExportReport, ExportSummary};
pub use tree_copier::{ExportProgress, TreeCopier};
