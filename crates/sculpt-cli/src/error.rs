use sculpt::core::error::StructureError;
use sculpt::core::tables::TableLoadError;
use sculpt::core::topology::registry::TemplateLoadError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Templates(#[from] TemplateLoadError),

    #[error(transparent)]
    Tables(#[from] TableLoadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
