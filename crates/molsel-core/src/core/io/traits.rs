use crate::core::models::mask::Mask;
use crate::core::models::structure::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing molecular file formats.
///
/// Implementors handle format-specific parsing and serialization; the trait
/// supplies path-based conveniences on top of the reader/writer entry
/// points. Writers take an optional [`Mask`] restricting which atoms are
/// serialized (all atoms when omitted).
pub trait StructureFile {
    /// Format-specific side data preserved across a read/write round trip
    /// (e.g. header lines).
    type Metadata;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a structure from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<(Structure, Self::Metadata), Self::Error>;

    /// Writes a structure and metadata to a writer, optionally restricted to
    /// the atoms selected by `mask`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the mask does not match the
    /// structure.
    fn write_to(
        structure: &Structure,
        metadata: &Self::Metadata,
        mask: Option<&Mask>,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes a structure without metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the mask does not match the
    /// structure.
    fn write_structure_to(
        structure: &Structure,
        mask: Option<&Mask>,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<(Structure, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a structure and metadata to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        structure: &Structure,
        metadata: &Self::Metadata,
        mask: Option<&Mask>,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(structure, metadata, mask, &mut writer)
    }

    /// Writes a structure to a file path without metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_structure_to_path<P: AsRef<Path>>(
        structure: &Structure,
        mask: Option<&Mask>,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_structure_to(structure, mask, &mut writer)
    }
}
