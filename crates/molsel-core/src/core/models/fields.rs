use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Distinguishes standard polymer atoms from heteroatoms, mirroring the
/// `ATOM`/`HETATM` record types of common structure file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordKind {
    /// A standard polymer atom (`ATOM` record).
    #[default]
    Atom,
    /// A heteroatom such as a ligand, ion, or water (`HETATM` record).
    Hetatm,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid record kind '{0}', expected 'ATOM' or 'HETATM'")]
pub struct ParseRecordKindError(pub String);

impl FromStr for RecordKind {
    type Err = ParseRecordKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ATOM" => Ok(RecordKind::Atom),
            "HETATM" => Ok(RecordKind::Hetatm),
            _ => Err(ParseRecordKindError(s.to_string())),
        }
    }
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Atom => "ATOM",
            RecordKind::Hetatm => "HETATM",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The enumerated set of per-atom attribute columns of a structure.
///
/// Dynamic attribute access goes through this enum rather than reflection:
/// a column name is resolved once via [`FromStr`], and unknown names are
/// rejected with [`UnknownFieldError`] at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomField {
    /// Unique atom serial number.
    Serial,
    /// Atom name (e.g. "CA").
    Name,
    /// Residue name (e.g. "CYS").
    Resname,
    /// Residue sequence id; may repeat across insertion variants.
    Resid,
    /// Chain identifier.
    Chain,
    /// Segment identifier.
    Segid,
    /// Insertion code, empty for most atoms.
    Insertion,
    /// Record kind (`ATOM`/`HETATM`).
    Record,
    /// Element symbol.
    Element,
    /// Coordinates of the active frame.
    Coords,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown atom field '{0}'")]
pub struct UnknownFieldError(pub String);

impl FromStr for AtomField {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(AtomField::Serial),
            "name" => Ok(AtomField::Name),
            "resname" => Ok(AtomField::Resname),
            "resid" => Ok(AtomField::Resid),
            "chain" => Ok(AtomField::Chain),
            "segid" => Ok(AtomField::Segid),
            "insertion" => Ok(AtomField::Insertion),
            "record" => Ok(AtomField::Record),
            "element" => Ok(AtomField::Element),
            "coords" => Ok(AtomField::Coords),
            _ => Err(UnknownFieldError(s.to_string())),
        }
    }
}

impl AtomField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtomField::Serial => "serial",
            AtomField::Name => "name",
            AtomField::Resname => "resname",
            AtomField::Resid => "resid",
            AtomField::Chain => "chain",
            AtomField::Segid => "segid",
            AtomField::Insertion => "insertion",
            AtomField::Record => "record",
            AtomField::Element => "element",
            AtomField::Coords => "coords",
        }
    }
}

impl fmt::Display for AtomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single attribute value, used for scalar broadcast in `set`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Str(String),
    Record(RecordKind),
    Coord(Point3<f64>),
}

impl FieldValue {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "int",
            FieldValue::Str(_) => "str",
            FieldValue::Record(_) => "record",
            FieldValue::Coord(_) => "coord",
        }
    }
}

/// A column of attribute values, returned by `get` and accepted by `set`.
///
/// Values are index-aligned with the atoms they were read from (or will be
/// written to), in structure order, duplicates included.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    Ints(Vec<i64>),
    Strs(Vec<String>),
    Records(Vec<RecordKind>),
    Coords(Vec<Point3<f64>>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Ints(v) => v.len(),
            FieldValues::Strs(v) => v.len(),
            FieldValues::Records(v) => v.len(),
            FieldValues::Coords(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            FieldValues::Ints(_) => "int",
            FieldValues::Strs(_) => "str",
            FieldValues::Records(_) => "record",
            FieldValues::Coords(_) => "coord",
        }
    }
}

/// The right-hand side of a `set`: a scalar broadcast to every selected atom,
/// or one value per selected atom.
#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    Scalar(FieldValue),
    PerAtom(FieldValues),
}

impl From<FieldValue> for SetValue {
    fn from(value: FieldValue) -> Self {
        SetValue::Scalar(value)
    }
}

impl From<FieldValues> for SetValue {
    fn from(values: FieldValues) -> Self {
        SetValue::PerAtom(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_kind_parses_case_insensitively() {
        assert_eq!(RecordKind::from_str("ATOM"), Ok(RecordKind::Atom));
        assert_eq!(RecordKind::from_str("hetatm"), Ok(RecordKind::Hetatm));
        assert_eq!(RecordKind::from_str(" Atom "), Ok(RecordKind::Atom));
    }

    #[test]
    fn record_kind_rejects_unknown_strings() {
        let err = RecordKind::from_str("ANISOU").unwrap_err();
        assert_eq!(err, ParseRecordKindError("ANISOU".to_string()));
    }

    #[test]
    fn record_kind_round_trips_through_display() {
        assert_eq!(RecordKind::Atom.to_string(), "ATOM");
        assert_eq!(RecordKind::Hetatm.to_string(), "HETATM");
        assert_eq!(
            RecordKind::from_str(&RecordKind::Hetatm.to_string()),
            Ok(RecordKind::Hetatm)
        );
    }

    #[test]
    fn atom_field_parses_known_names() {
        assert_eq!(AtomField::from_str("resid"), Ok(AtomField::Resid));
        assert_eq!(AtomField::from_str("RESNAME"), Ok(AtomField::Resname));
        assert_eq!(AtomField::from_str(" coords "), Ok(AtomField::Coords));
    }

    #[test]
    fn atom_field_rejects_unknown_names() {
        assert_eq!(
            AtomField::from_str("charge"),
            Err(UnknownFieldError("charge".to_string()))
        );
    }

    #[test]
    fn field_values_report_length() {
        let vals = FieldValues::Ints(vec![1, 2, 3]);
        assert_eq!(vals.len(), 3);
        assert!(!vals.is_empty());
        assert!(FieldValues::Strs(Vec::new()).is_empty());
    }

    #[test]
    fn set_value_from_conversions() {
        let scalar: SetValue = FieldValue::Int(7).into();
        assert!(matches!(scalar, SetValue::Scalar(FieldValue::Int(7))));
        let column: SetValue = FieldValues::Ints(vec![1]).into();
        assert!(matches!(column, SetValue::PerAtom(_)));
    }
}
