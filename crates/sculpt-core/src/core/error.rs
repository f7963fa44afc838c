use std::io;
use thiserror::Error;

/// Maximum accepted length of a structure name.
pub const MAX_STRUCTURE_NAME_LEN: usize = 30;

/// Errors raised while assembling or mutating a structure.
///
/// Lookup misses (chain by name, design site by position, atom by name) are
/// deliberately *not* errors; they are returned as `Option::None` because
/// callers routinely probe for optional data.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ParseErrorKind,
    },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Data not found: {0}")]
    NotFound(String),
}

/// Field-level failures while parsing a fixed-column atom record.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("Invalid integer in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
}

/// Non-fatal validation failures; the reporting operation returns a failure
/// status without corrupting already-built state.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Name '{name}' exceeds maximum length {max}")]
    NameTooLong { name: String, max: usize },
    #[error("{chain_kind} does not have nucleotide type '{code}'")]
    InvalidNucleotideCode { chain_kind: String, code: char },
    #[error("Implausible coordinate for atom '{atom}' of residue {residue} {position}")]
    ImplausibleCoordinate {
        atom: String,
        residue: String,
        position: isize,
    },
}
