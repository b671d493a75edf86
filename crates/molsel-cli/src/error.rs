use molsel::core::io::pdb::PdbError;
use molsel::core::models::structure::StructureError;
use molsel::ops::residues::ResidueOpError;
use molsel::select::SelectionError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    ResidueOp(#[from] ResidueOpError),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: PdbError,
    },

    #[error("Failed to write file '{path}': {source}", path = path.display())]
    FileWriting {
        path: PathBuf,
        #[source]
        source: PdbError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
