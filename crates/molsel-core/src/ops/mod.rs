//! # Ops Module
//!
//! Residue-level procedures built on the structure store and the selection
//! layer: single-letter sequence extraction and whole-residue renaming.
//! This is the highest-level, user-facing layer of the library.

pub mod residues;
