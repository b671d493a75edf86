//! Provides input/output functionality for molecular file formats.
//!
//! This module contains a unified trait-based interface for reading and
//! writing structure files, and an implementation for the fixed-column PDB
//! subset (`ATOM`/`HETATM`/`MODEL`/`ENDMDL`/`TER`/`END`). Writers accept an
//! optional selection mask restricting which atoms are serialized.

pub mod pdb;
pub mod traits;
