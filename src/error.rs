use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvExportError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{file}:{line}: truncated CONFIG declaration")]
    MalformedDeclaration { file: String, line: usize },

    #[error("{file}:{line}: CONFIG_REGION marker not followed by `ifdef or `ifndef")]
    MalformedRegion { file: String, line: usize },

    #[error("No HDL source files found in project")]
    NoSourcesFound { searched_extensions: Vec<String> },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,

    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Output directory already exists: {path}")]
    OutputDirectoryExists { path: String },

    #[error("Synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("Could not parse synthesis report: {path}")]
    ReportParse { path: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for SvExportError {
    fn user_message(&self) -> String {
        match self {
            SvExportError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            SvExportError::MalformedDeclaration { file, line } => {
                format!(
                    "Malformed CONFIG declaration at {}:{}: file ends before the description and `define lines",
                    file, line
                )
            }
            SvExportError::MalformedRegion { file, line } => {
                format!(
                    "Malformed CONFIG_REGION at {}:{}: marker must be immediately followed by `ifdef or `ifndef",
                    file, line
                )
            }
            SvExportError::NoSourcesFound {
                searched_extensions,
            } => {
                format!(
                    "No HDL source files found with extensions: {}",
                    searched_extensions.join(", ")
                )
            }
            SvExportError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            SvExportError::Cancelled => "Operation was cancelled by user".to_string(),
            SvExportError::FileTooLarge { size, max_size } => {
                format!(
                    "File too large: {} (maximum allowed: {})",
                    format_bytes(*size),
                    format_bytes(*max_size)
                )
            }
            SvExportError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            SvExportError::OutputDirectoryExists { path } => {
                format!("Output directory already exists: {}", path)
            }
            SvExportError::Synthesis { message } => {
                format!("Synthesis failed: {}", message)
            }
            SvExportError::ReportParse { path } => {
                format!("Could not parse synthesis report: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SvExportError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            SvExportError::MalformedDeclaration { .. } => Some(
                "Every `// CONFIG: <name>` comment must be followed by a description line and a definition line. Fix the configuration source before exporting.".to_string()
            ),
            SvExportError::MalformedRegion { .. } => Some(
                "Place the `ifdef/`ifndef directive on the line directly after the `// CONFIG_REGION: <name>` comment, or remove the marker.".to_string()
            ),
            SvExportError::NoSourcesFound { .. } => Some(
                "Try different file extensions with --formats (e.g., --formats sv,svh,v) or check the project path.".to_string()
            ),
            SvExportError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the target directory.".to_string()
            ),
            SvExportError::FileTooLarge { .. } => Some(
                "Increase the maximum file size limit with --max-size or exclude large files.".to_string()
            ),
            SvExportError::OutputDirectoryExists { .. } => Some(
                "Remove the existing directory, choose a different export path with --export, or use --force to overwrite.".to_string()
            ),
            SvExportError::Synthesis { .. } => Some(
                "Verify the synthesis script path in the [synthesis] config section and that the project sits inside the expected flow tree.".to_string()
            ),
            SvExportError::ReportParse { .. } => Some(
                "Check that synthesis completed and produced area reports, and that the report pattern matches your flow's output.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SvExportError {
    fn from(error: toml::de::Error) -> Self {
        SvExportError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SvExportError>;

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
