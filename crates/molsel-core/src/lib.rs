//! # molsel Core Library
//!
//! A columnar molecular structure store with a VMD-style atom selection language
//! and in-place mutation operations for structure preparation workflows.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains the columnar [`core::models::structure::Structure`]
//!   container (per-atom attribute columns plus one or more coordinate frames), the
//!   row-wise builder, spatial-query utilities, and file I/O.
//!
//! - **[`select`]: The Logic Core.** The selection language: a recursive-descent
//!   parser over boolean combinators, attribute predicates, static macros
//!   (`protein`, `water`, `noh`, ...), and spatial predicates (`within`, `same ... as`),
//!   evaluated bottom-up into a boolean [`core::models::mask::Mask`] over atoms.
//!
//! - **[`ops`]: The Public API.** Residue-level procedures built on the two layers
//!   below: single-letter sequence extraction and whole-residue renaming.
//!
//! Selection evaluation is pure: it never mutates a structure, and the same
//! expression evaluated against an unmutated structure always yields the same mask.

pub mod core;
pub mod ops;
pub mod select;
