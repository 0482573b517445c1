pub mod report;
pub mod runner;

pub use report::{AreaFigure, ReportScraper};
pub use runner::SynthesisRunner;
