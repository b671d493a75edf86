//! # Core Models Module
//!
//! This module contains the data structures used to represent molecular
//! structures in molsel, providing the foundation for all selection and
//! mutation operations.
//!
//! ## Key Components
//!
//! - [`fields`] - The enumerated set of per-atom attribute columns and the
//!   typed values they hold
//! - [`frame`] - A single coordinate frame (one 3-vector per atom)
//! - [`mask`] - Boolean masks over atoms, the currency of the selection layer
//! - [`structure`] - The columnar structure container and its mutation operations
//! - [`builder`] - Row-wise construction of structures, used by file readers
//!
//! ## Usage
//!
//! ```ignore
//! use molsel::core::models::builder::{AtomRow, StructureBuilder};
//!
//! let mut builder = StructureBuilder::new();
//! builder.push_atom(AtomRow { /* ... */ });
//! let structure = builder.build();
//! ```

pub mod builder;
pub mod fields;
pub mod frame;
pub mod mask;
pub mod structure;
