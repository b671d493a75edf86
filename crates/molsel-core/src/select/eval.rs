use super::parser::{Expr, IntField, SameGroup, StrField};
use crate::core::models::mask::Mask;
use crate::core::models::structure::Structure;
use crate::core::utils::spatial;
use std::collections::HashSet;

/// Evaluates a predicate tree bottom-up into a per-atom boolean mask.
///
/// Pure: reads attribute columns and the active frame, mutates nothing.
pub(crate) fn evaluate(expr: &Expr, structure: &Structure) -> Mask {
    Mask::new(eval_bits(expr, structure))
}

fn eval_bits(expr: &Expr, s: &Structure) -> Vec<bool> {
    let n = s.len();
    match expr {
        Expr::All => vec![true; n],
        Expr::None => vec![false; n],
        Expr::StrIn { field, values } => {
            let column = str_column(*field, s);
            column
                .iter()
                .map(|entry| values.iter().any(|v| v.eq_ignore_ascii_case(entry)))
                .collect()
        }
        Expr::IntIn { field, tests } => {
            let column = match field {
                IntField::Serial => s.serials(),
                IntField::Resid => s.resids(),
            };
            column
                .iter()
                .map(|&entry| tests.iter().any(|t| t.matches(entry)))
                .collect()
        }
        Expr::RecordIn { kinds } => s
            .records()
            .iter()
            .map(|record| kinds.contains(record))
            .collect(),
        Expr::Not(inner) => eval_bits(inner, s).into_iter().map(|b| !b).collect(),
        Expr::And(left, right) => {
            let l = eval_bits(left, s);
            let r = eval_bits(right, s);
            l.into_iter().zip(r).map(|(a, b)| a && b).collect()
        }
        Expr::Or(left, right) => {
            let l = eval_bits(left, s);
            let r = eval_bits(right, s);
            l.into_iter().zip(r).map(|(a, b)| a || b).collect()
        }
        Expr::Within { distance, of } => {
            let sub = eval_bits(of, s);
            let coords = s.coords();
            let reference: Vec<[f64; 3]> = coords
                .iter()
                .zip(&sub)
                .filter_map(|(p, &selected)| selected.then(|| spatial::to_array(p)))
                .collect();
            spatial::near_any(reference, coords, *distance)
        }
        Expr::Same { group, of } => {
            let sub = eval_bits(of, s);
            match group {
                SameGroup::Chain => same_by_key(s.chains(), &sub),
                SameGroup::Segid => same_by_key(s.segids(), &sub),
                SameGroup::Residue => {
                    let keys: HashSet<(&str, &str, i64, &str)> = sub
                        .iter()
                        .enumerate()
                        .filter_map(|(i, &selected)| selected.then(|| residue_key(s, i)))
                        .collect();
                    (0..s.len()).map(|i| keys.contains(&residue_key(s, i))).collect()
                }
            }
        }
    }
}

fn str_column<'a>(field: StrField, s: &'a Structure) -> &'a [String] {
    match field {
        StrField::Name => s.names(),
        StrField::Resname => s.resnames(),
        StrField::Chain => s.chains(),
        StrField::Segid => s.segids(),
        StrField::Insertion => s.insertions(),
        StrField::Element => s.elements(),
    }
}

fn residue_key(s: &Structure, i: usize) -> (&str, &str, i64, &str) {
    (
        s.chains()[i].as_str(),
        s.segids()[i].as_str(),
        s.resids()[i],
        s.insertions()[i].as_str(),
    )
}

fn same_by_key(column: &[String], sub: &[bool]) -> Vec<bool> {
    let keys: HashSet<&str> = column
        .iter()
        .zip(sub)
        .filter_map(|(value, &selected)| selected.then_some(value.as_str()))
        .collect();
    column.iter().map(|value| keys.contains(value.as_str())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::{AtomRow, StructureBuilder};
    use crate::core::models::fields::RecordKind;
    use crate::select::Selection;
    use nalgebra::Point3;

    fn atom(
        serial: i64,
        name: &str,
        resname: &str,
        resid: i64,
        chain: &str,
        element: &str,
        x: f64,
    ) -> AtomRow {
        AtomRow {
            serial,
            name: name.to_string(),
            resname: resname.to_string(),
            resid,
            chain: chain.to_string(),
            segid: format!("SEG{chain}"),
            insertion: String::new(),
            record: RecordKind::Atom,
            element: element.to_string(),
            position: Point3::new(x, 0.0, 0.0),
        }
    }

    fn dipeptide_with_water() -> Structure {
        let mut b = StructureBuilder::new();
        // ALA 1: backbone + CB + one hydrogen
        b.push_atom(atom(1, "N", "ALA", 1, "A", "N", 0.0))
            .push_atom(atom(2, "CA", "ALA", 1, "A", "C", 1.5))
            .push_atom(atom(3, "C", "ALA", 1, "A", "C", 3.0))
            .push_atom(atom(4, "O", "ALA", 1, "A", "O", 4.0))
            .push_atom(atom(5, "CB", "ALA", 1, "A", "C", 2.0))
            .push_atom(atom(6, "HA", "ALA", 1, "A", "H", 1.6))
            // GLY 2 backbone
            .push_atom(atom(7, "N", "GLY", 2, "A", "N", 5.0))
            .push_atom(atom(8, "CA", "GLY", 2, "A", "C", 6.5))
            .push_atom(atom(9, "C", "GLY", 2, "A", "C", 8.0))
            .push_atom(atom(10, "O", "GLY", 2, "A", "O", 9.0));
        // Water in its own chain, 30 A away
        let mut ow = atom(11, "OW", "HOH", 100, "W", "O", 30.0);
        ow.record = RecordKind::Hetatm;
        b.push_atom(ow);
        b.build()
    }

    fn mask_for(s: &Structure, expr: &str) -> Mask {
        Selection::parse(expr).unwrap().evaluate(s)
    }

    #[test]
    fn mask_length_always_equals_atom_count() {
        let s = dipeptide_with_water();
        for expr in ["all", "none", "name CA", "within 2.0 of name CB"] {
            assert_eq!(mask_for(&s, expr).len(), s.len());
        }
    }

    #[test]
    fn string_matching_is_case_insensitive() {
        let s = dipeptide_with_water();
        assert_eq!(mask_for(&s, "resname ala").count(), 6);
        assert_eq!(mask_for(&s, "name ca").count(), 2);
    }

    #[test]
    fn protein_macro_excludes_water() {
        let s = dipeptide_with_water();
        let mask = mask_for(&s, "protein");
        assert_eq!(mask.count(), 10);
        assert!(!mask.get(10));
    }

    #[test]
    fn noh_macro_drops_hydrogens() {
        let s = dipeptide_with_water();
        let mask = mask_for(&s, "protein and noh");
        assert_eq!(mask.count(), 9);
        let hydrogens = mask_for(&s, "hydrogen");
        assert_eq!(hydrogens.count(), 1);
        assert!(hydrogens.get(5));
    }

    #[test]
    fn backbone_and_sidechain_partition_protein_heavy_atoms() {
        let s = dipeptide_with_water();
        let backbone = mask_for(&s, "backbone");
        assert_eq!(backbone.count(), 8);
        let sidechain = mask_for(&s, "sidechain and noh");
        assert_eq!(sidechain.count(), 1);
        assert!(sidechain.get(4)); // CB
    }

    #[test]
    fn record_predicate_distinguishes_hetatm() {
        let s = dipeptide_with_water();
        let het = mask_for(&s, "record HETATM");
        assert_eq!(het.count(), 1);
        assert!(het.get(10));
    }

    #[test]
    fn within_includes_the_sub_selection_itself() {
        let s = dipeptide_with_water();
        let mask = mask_for(&s, "within 0.0 of name CB");
        assert_eq!(mask.count(), 1);
        assert!(mask.get(4));
    }

    #[test]
    fn within_matches_atoms_up_to_the_cutoff() {
        let s = dipeptide_with_water();
        // CB is at x=2.0; CA (1.5), C (3.0), and HA (1.6) are within 1.0.
        let mask = mask_for(&s, "within 1.0 of name CB");
        let hits: Vec<usize> = mask.indices().collect();
        assert_eq!(hits, vec![1, 2, 4, 5]);
    }

    #[test]
    fn within_of_empty_sub_selection_matches_nothing() {
        let s = dipeptide_with_water();
        let mask = mask_for(&s, "within 100.0 of resname XXX");
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn same_residue_as_expands_to_whole_residues() {
        let s = dipeptide_with_water();
        let mask = mask_for(&s, "same residue as name CB");
        assert_eq!(mask.count(), 6);
        assert!(mask.indices().all(|i| s.resnames()[i] == "ALA"));
    }

    #[test]
    fn same_chain_as_covers_the_full_chain() {
        let s = dipeptide_with_water();
        let mask = mask_for(&s, "same chain as name CB");
        assert_eq!(mask.count(), 10);
        let water = mask_for(&s, "same chain as resname HOH");
        assert_eq!(water.count(), 1);
    }

    #[test]
    fn same_segid_as_groups_on_segment() {
        let s = dipeptide_with_water();
        let mask = mask_for(&s, "same segid as name OW");
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn within_composes_with_booleans() {
        let s = dipeptide_with_water();
        let mask = mask_for(&s, "within 1.0 of name CB and not name CB");
        assert_eq!(mask.count(), 3);
    }
}
