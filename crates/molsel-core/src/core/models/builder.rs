use super::fields::RecordKind;
use super::frame::Frame;
use super::structure::{Structure, StructureError};
use nalgebra::Point3;

/// One atom's worth of attribute values, used for row-wise construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRow {
    pub serial: i64,
    pub name: String,
    pub resname: String,
    pub resid: i64,
    pub chain: String,
    pub segid: String,
    pub insertion: String,
    pub record: RecordKind,
    pub element: String,
    /// Position in the first frame.
    pub position: Point3<f64>,
}

/// Row-wise builder for [`Structure`], used by file readers and tests.
///
/// Atoms are pushed one at a time; their positions populate the first frame.
/// Additional frames are added afterwards and validated against the atom
/// count as they arrive, so a finished builder always yields a structure
/// satisfying the column/frame alignment invariant.
#[derive(Debug)]
pub struct StructureBuilder {
    structure: Structure,
}

impl Default for StructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self {
            structure: Structure::new(),
        }
    }

    /// Starts from an existing structure, e.g. to add frames to it.
    pub fn from_structure(structure: &Structure) -> Self {
        Self {
            structure: structure.clone(),
        }
    }

    /// Appends one atom row; its position lands in the first frame.
    pub fn push_atom(&mut self, row: AtomRow) -> &mut Self {
        let s = &mut self.structure;
        s.serial.push(row.serial);
        s.name.push(row.name);
        s.resname.push(row.resname);
        s.resid.push(row.resid);
        s.chain.push(row.chain);
        s.segid.push(row.segid);
        s.insertion.push(row.insertion);
        s.record.push(row.record);
        s.element.push(row.element);
        if s.frames.is_empty() {
            s.frames.push(Frame::default());
        }
        s.frames[0].coords_mut().push(row.position);
        self
    }

    /// Adds a full coordinate frame after all atoms have been pushed.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::FrameLengthMismatch`] if the frame does not
    /// have exactly one coordinate per atom.
    pub fn add_frame(&mut self, coords: Vec<Point3<f64>>) -> Result<&mut Self, StructureError> {
        let expected = self.structure.len();
        if coords.len() != expected {
            return Err(StructureError::FrameLengthMismatch {
                expected,
                actual: coords.len(),
            });
        }
        self.structure.frames.push(Frame::new(coords));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.structure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structure.is_empty()
    }

    pub fn build(self) -> Structure {
        self.structure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(serial: i64, name: &str) -> AtomRow {
        AtomRow {
            serial,
            name: name.to_string(),
            resname: "ALA".to_string(),
            resid: 1,
            chain: "A".to_string(),
            segid: String::new(),
            insertion: String::new(),
            record: RecordKind::Atom,
            element: "C".to_string(),
            position: Point3::new(serial as f64, 0.0, 0.0),
        }
    }

    #[test]
    fn empty_builder_yields_empty_frameless_structure() {
        let s = StructureBuilder::new().build();
        assert!(s.is_empty());
        assert_eq!(s.frame_count(), 0);
    }

    #[test]
    fn pushed_atoms_populate_columns_and_first_frame() {
        let mut b = StructureBuilder::new();
        b.push_atom(row(1, "CA")).push_atom(row(2, "CB"));
        let s = b.build();
        assert_eq!(s.len(), 2);
        assert_eq!(s.frame_count(), 1);
        assert_eq!(s.names(), &["CA".to_string(), "CB".to_string()]);
        assert_eq!(s.coords()[1].x, 2.0);
    }

    #[test]
    fn add_frame_validates_length() {
        let mut b = StructureBuilder::new();
        b.push_atom(row(1, "CA")).push_atom(row(2, "CB"));
        let err = b.add_frame(vec![Point3::origin()]).unwrap_err();
        assert_eq!(
            err,
            StructureError::FrameLengthMismatch {
                expected: 2,
                actual: 1
            }
        );
        b.add_frame(vec![Point3::origin(), Point3::origin()]).unwrap();
        assert_eq!(b.build().frame_count(), 2);
    }

    #[test]
    fn from_structure_starts_with_existing_rows() {
        let mut b = StructureBuilder::new();
        b.push_atom(row(1, "CA"));
        let s = b.build();
        let mut b2 = StructureBuilder::from_structure(&s);
        b2.push_atom(row(2, "CB"));
        assert_eq!(b2.build().len(), 2);
    }
}
