pub mod append;
pub mod filter;
pub mod info;
pub mod mutate;
pub mod select;
pub mod sequence;
pub mod transform;

use crate::error::{CliError, Result};
use molsel::core::io::pdb::{PdbFile, PdbMetadata};
use molsel::core::io::traits::StructureFile;
use molsel::core::models::mask::Mask;
use molsel::core::models::structure::Structure;
use std::path::Path;
use tracing::info;

pub(crate) fn load_structure(path: &Path) -> Result<(Structure, PdbMetadata)> {
    let (structure, metadata) =
        PdbFile::read_from_path(path).map_err(|source| CliError::FileParsing {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        atoms = structure.len(),
        frames = structure.frame_count(),
        path = %path.display(),
        "loaded structure"
    );
    Ok((structure, metadata))
}

pub(crate) fn write_structure(
    structure: &Structure,
    metadata: &PdbMetadata,
    mask: Option<&Mask>,
    path: &Path,
) -> Result<()> {
    PdbFile::write_to_path(structure, metadata, mask, path).map_err(|source| {
        CliError::FileWriting {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!(path = %path.display(), "wrote structure");
    Ok(())
}
