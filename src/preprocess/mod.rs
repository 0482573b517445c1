pub mod config_extract;
pub mod cursor;
pub mod stripper;

pub use config_extract::{ConfigExtractor, EnabledSet};
pub use cursor::LineCursor;
pub use stripper::DirectiveStripper;
