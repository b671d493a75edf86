//! # Selection Module
//!
//! The atom selection language: a small boolean query language over atom
//! attributes and spatial relationships, in the style of interactive
//! molecular viewers.
//!
//! Supported expressions:
//! - attribute membership: `name CA CB`, `resname CYS`, `chain A`,
//!   `segid P1`, `insertion A`, `element H`, `record HETATM`
//! - numeric predicates: `resid 58`, `resid 1-10`, `resid 1:10`,
//!   `serial > 100`
//! - combinators: `and`, `or`, `not`, parentheses
//! - macros: `protein`, `water`, `lipids`, `ions`, `hydrogen`, `noh`,
//!   `backbone`, `sidechain`, plus user-defined macros via [`MacroRegistry`]
//! - spatial predicates: `within 5.0 of resname LIG`,
//!   `same residue as name SG` (also `same chain as`, `same segid as`)
//!
//! Parsing produces an immutable [`Selection`]; evaluation walks the
//! predicate tree bottom-up against a [`Structure`] and returns a boolean
//! [`Mask`] over its atoms. Evaluation is pure and deterministic: it never
//! mutates the structure, and the same expression against an unmutated
//! structure always yields the identical mask. Spatial predicates read the
//! active frame only.

mod eval;
mod macros;
mod parser;
mod token;

pub mod error;

pub use error::SelectionError;
pub use macros::MacroRegistry;

use crate::core::models::mask::Mask;
use crate::core::models::structure::Structure;
use parser::Expr;

/// A parsed selection expression.
///
/// A `Selection` is immutable and reusable: it can be evaluated any number
/// of times against any number of structures.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    text: String,
    root: Expr,
}

impl Selection {
    /// Parses a selection expression using the built-in macros only.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Parse`] for a malformed expression and
    /// [`SelectionError::Semantic`] for an unknown keyword or attribute;
    /// both carry the offending text.
    pub fn parse(expr: &str) -> Result<Self, SelectionError> {
        Self::parse_with(expr, &MacroRegistry::default())
    }

    /// Parses a selection expression against an explicit macro registry.
    pub fn parse_with(expr: &str, macros: &MacroRegistry) -> Result<Self, SelectionError> {
        let root = parser::parse(expr, macros)?;
        Ok(Self {
            text: expr.to_string(),
            root,
        })
    }

    /// The original expression text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Evaluates the selection against a structure, producing a boolean mask
    /// with one entry per atom.
    pub fn evaluate(&self, structure: &Structure) -> Mask {
        eval::evaluate(&self.root, structure)
    }
}

/// Parses and evaluates an expression in one step, with built-in macros.
pub fn select(structure: &Structure, expr: &str) -> Result<Mask, SelectionError> {
    Ok(Selection::parse(expr)?.evaluate(structure))
}
