use super::fields::{AtomField, FieldValue, FieldValues, RecordKind, SetValue};
use super::frame::Frame;
use super::mask::Mask;
use crate::core::utils::spatial;
use nalgebra::{Matrix3, Point3, Vector3};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Default distance threshold, in Angstroms, below which an incoming atom is
/// considered to collide with an existing atom during [`Structure::append`].
pub const DEFAULT_COLLISION_DISTANCE: f64 = 1.3;

/// Collision-removal policy for [`Structure::append`].
///
/// Incoming atoms whose distance (active frames on both sides) to any atom
/// already in the structure is less than or equal to `distance` are dropped
/// before concatenation. Existing atoms are always kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPolicy {
    pub distance: f64,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self {
            distance: DEFAULT_COLLISION_DISTANCE,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StructureError {
    #[error("mask length {mask_len} does not match atom count {atom_count}")]
    MaskLengthMismatch { mask_len: usize, atom_count: usize },

    #[error("value length {actual} does not match selected atom count {expected} for field '{field}'")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("field '{field}' cannot be set from a value of type '{given}'")]
    TypeMismatch {
        field: &'static str,
        given: &'static str,
    },

    #[error("atom index {index} out of range for structure with {count} atoms")]
    AtomIndexOutOfRange { index: usize, count: usize },

    #[error("frame index {index} out of range for structure with {count} frames")]
    FrameIndexOutOfRange { index: usize, count: usize },

    #[error("frame length {actual} does not match atom count {expected}")]
    FrameLengthMismatch { expected: usize, actual: usize },

    #[error("exactly one of `keep` or `drop` must be given to drop_frames")]
    InvalidFrameSpec,

    #[error("cannot drop every frame of a non-empty structure")]
    CannotDropAllFrames,
}

/// An in-memory columnar representation of a molecular structure.
///
/// One row per atom: every attribute column and every coordinate frame has
/// exactly `len()` entries, index-aligned. A structure owns one or more
/// frames; the *active* frame supplies the coordinates used by
/// `get(Coords)`, by spatial selection predicates, and by collision pruning.
///
/// Structures are exclusively owned: `clone()` produces a fully independent
/// deep copy (all columns and all frames), and no operation aliases data
/// between two structures. Mutations are all-or-nothing: every operation
/// validates its inputs before touching any column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    pub(crate) serial: Vec<i64>,
    pub(crate) name: Vec<String>,
    pub(crate) resname: Vec<String>,
    pub(crate) resid: Vec<i64>,
    pub(crate) chain: Vec<String>,
    pub(crate) segid: Vec<String>,
    pub(crate) insertion: Vec<String>,
    pub(crate) record: Vec<RecordKind>,
    pub(crate) element: Vec<String>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) active_frame: usize,
}

impl Structure {
    /// Creates a new, empty structure with no atoms and no frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of atoms (rows).
    pub fn len(&self) -> usize {
        self.serial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serial.is_empty()
    }

    /// Number of coordinate frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Index of the active frame.
    pub fn active_frame(&self) -> usize {
        self.active_frame
    }

    /// Switches the active frame.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::FrameIndexOutOfRange`] if `index` does not
    /// name an existing frame.
    pub fn set_active_frame(&mut self, index: usize) -> Result<(), StructureError> {
        if index >= self.frames.len() {
            return Err(StructureError::FrameIndexOutOfRange {
                index,
                count: self.frames.len(),
            });
        }
        self.active_frame = index;
        Ok(())
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    // --- Column accessors (read-only slices, index-aligned with atoms) ---

    pub fn serials(&self) -> &[i64] {
        &self.serial
    }

    pub fn names(&self) -> &[String] {
        &self.name
    }

    pub fn resnames(&self) -> &[String] {
        &self.resname
    }

    pub fn resids(&self) -> &[i64] {
        &self.resid
    }

    pub fn chains(&self) -> &[String] {
        &self.chain
    }

    pub fn segids(&self) -> &[String] {
        &self.segid
    }

    pub fn insertions(&self) -> &[String] {
        &self.insertion
    }

    pub fn records(&self) -> &[RecordKind] {
        &self.record
    }

    pub fn elements(&self) -> &[String] {
        &self.element
    }

    /// Coordinates of the active frame (empty for an empty structure).
    pub fn coords(&self) -> &[Point3<f64>] {
        self.frames
            .get(self.active_frame)
            .map(|f| f.coords())
            .unwrap_or(&[])
    }

    /// Retrieves attribute values for the selected atoms.
    ///
    /// Values come back in structure order, one per matched atom, duplicates
    /// included. With `mask` omitted, every atom is read. A mask matching
    /// zero atoms is not an error: the result is simply empty.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::MaskLengthMismatch`] if the mask was
    /// evaluated against a structure of a different length.
    pub fn get(&self, field: AtomField, mask: Option<&Mask>) -> Result<FieldValues, StructureError> {
        let indices = self.selected_indices(mask)?;
        Ok(match field {
            AtomField::Serial => {
                FieldValues::Ints(indices.iter().map(|&i| self.serial[i]).collect())
            }
            AtomField::Resid => FieldValues::Ints(indices.iter().map(|&i| self.resid[i]).collect()),
            AtomField::Name => {
                FieldValues::Strs(indices.iter().map(|&i| self.name[i].clone()).collect())
            }
            AtomField::Resname => {
                FieldValues::Strs(indices.iter().map(|&i| self.resname[i].clone()).collect())
            }
            AtomField::Chain => {
                FieldValues::Strs(indices.iter().map(|&i| self.chain[i].clone()).collect())
            }
            AtomField::Segid => {
                FieldValues::Strs(indices.iter().map(|&i| self.segid[i].clone()).collect())
            }
            AtomField::Insertion => {
                FieldValues::Strs(indices.iter().map(|&i| self.insertion[i].clone()).collect())
            }
            AtomField::Element => {
                FieldValues::Strs(indices.iter().map(|&i| self.element[i].clone()).collect())
            }
            AtomField::Record => {
                FieldValues::Records(indices.iter().map(|&i| self.record[i]).collect())
            }
            AtomField::Coords => {
                let coords = self.coords();
                FieldValues::Coords(indices.iter().map(|&i| coords[i]).collect())
            }
        })
    }

    /// Writes an attribute value to every selected atom.
    ///
    /// A scalar value is broadcast to all matches; a per-atom column must
    /// have exactly one value per matched atom. Writing `Coords` affects the
    /// active frame only. Validation happens before any column is touched.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::ShapeMismatch`] if a per-atom column length
    /// disagrees with the match count, [`StructureError::TypeMismatch`] if
    /// the value type does not fit the field, and
    /// [`StructureError::MaskLengthMismatch`] for a foreign mask.
    pub fn set(
        &mut self,
        field: AtomField,
        value: impl Into<SetValue>,
        mask: Option<&Mask>,
    ) -> Result<(), StructureError> {
        let value = value.into();
        let indices = self.selected_indices(mask)?;
        match field {
            AtomField::Serial | AtomField::Resid => {
                let vals = expand_ints(&value, field, indices.len())?;
                let col = match field {
                    AtomField::Serial => &mut self.serial,
                    _ => &mut self.resid,
                };
                for (&i, v) in indices.iter().zip(vals) {
                    col[i] = v;
                }
            }
            AtomField::Name
            | AtomField::Resname
            | AtomField::Chain
            | AtomField::Segid
            | AtomField::Insertion
            | AtomField::Element => {
                let vals = expand_strs(&value, field, indices.len())?;
                let col = match field {
                    AtomField::Name => &mut self.name,
                    AtomField::Resname => &mut self.resname,
                    AtomField::Chain => &mut self.chain,
                    AtomField::Segid => &mut self.segid,
                    AtomField::Insertion => &mut self.insertion,
                    _ => &mut self.element,
                };
                for (&i, v) in indices.iter().zip(vals) {
                    col[i] = v;
                }
            }
            AtomField::Record => {
                let vals = expand_records(&value, field, indices.len())?;
                for (&i, v) in indices.iter().zip(vals) {
                    self.record[i] = v;
                }
            }
            AtomField::Coords => {
                let vals = expand_coords(&value, field, indices.len())?;
                if let Some(frame) = self.frames.get_mut(self.active_frame) {
                    for (&i, v) in indices.iter().zip(vals) {
                        frame.coords_mut()[i] = v;
                    }
                }
            }
        }
        Ok(())
    }

    /// Keeps only the selected atoms, discarding the rest from every column
    /// and every frame. Returns the number of atoms removed.
    pub fn filter(&mut self, mask: &Mask) -> Result<usize, StructureError> {
        self.check_mask(Some(mask))?;
        let keep = mask.as_slice();
        let removed = self.len() - mask.count();

        retain_rows(&mut self.serial, keep);
        retain_rows(&mut self.name, keep);
        retain_rows(&mut self.resname, keep);
        retain_rows(&mut self.resid, keep);
        retain_rows(&mut self.chain, keep);
        retain_rows(&mut self.segid, keep);
        retain_rows(&mut self.insertion, keep);
        retain_rows(&mut self.record, keep);
        retain_rows(&mut self.element, keep);
        for frame in &mut self.frames {
            frame.keep_rows(keep);
        }

        debug!(removed, kept = self.len(), "filtered structure");
        Ok(removed)
    }

    /// Concatenates another structure's atoms (and frames) onto the end.
    ///
    /// Frame counts are aligned by repeating the last frame of the side with
    /// fewer frames. With a [`CollisionPolicy`], incoming atoms within the
    /// policy distance of any existing atom are dropped before
    /// concatenation. Returns the number of atoms actually appended.
    pub fn append(&mut self, other: &Structure, collision: Option<&CollisionPolicy>) -> usize {
        if other.is_empty() {
            return 0;
        }
        let keep: Vec<bool> = match collision {
            Some(policy) if !self.is_empty() => {
                let reference: Vec<[f64; 3]> =
                    self.coords().iter().map(spatial::to_array).collect();
                spatial::near_any(reference, other.coords(), policy.distance)
                    .into_iter()
                    .map(|near| !near)
                    .collect()
            }
            _ => vec![true; other.len()],
        };
        let appended = keep.iter().filter(|&&k| k).count();
        let dropped = other.len() - appended;
        if dropped > 0 {
            debug!(dropped, "dropped colliding atoms before append");
        }
        let at = self.len();
        self.splice_rows(at, other, &keep);
        appended
    }

    /// Splices another structure's rows into this one at the given atom
    /// index, preserving the order of both halves.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::AtomIndexOutOfRange`] if `at` is past the
    /// end of the structure.
    pub fn insert(&mut self, other: &Structure, at: usize) -> Result<(), StructureError> {
        if at > self.len() {
            return Err(StructureError::AtomIndexOutOfRange {
                index: at,
                count: self.len(),
            });
        }
        if other.is_empty() {
            return Ok(());
        }
        let keep = vec![true; other.len()];
        self.splice_rows(at, other, &keep);
        Ok(())
    }

    /// Adds a translation vector to every coordinate in every frame.
    pub fn move_by(&mut self, offset: &Vector3<f64>) {
        for frame in &mut self.frames {
            frame.translate(offset);
        }
    }

    /// Applies `coords' = matrix * (coords - center) + center` to every atom
    /// of every frame. The default center is the origin.
    pub fn rotate_by(&mut self, matrix: &Matrix3<f64>, center: Option<&Point3<f64>>) {
        let center = center.copied().unwrap_or_else(Point3::origin);
        for frame in &mut self.frames {
            frame.rotate(matrix, &center);
        }
    }

    /// Retains (`keep`) or removes (`drop`) frames by index, returning the
    /// number of frames dropped. The active frame follows the retained set:
    /// if it survives it keeps pointing at the same frame, otherwise it
    /// falls back to the first retained frame.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::InvalidFrameSpec`] unless exactly one of
    /// `keep`/`drop` is given, [`StructureError::FrameIndexOutOfRange`] for
    /// an invalid index, and [`StructureError::CannotDropAllFrames`] if the
    /// operation would leave a non-empty structure frameless.
    pub fn drop_frames(
        &mut self,
        keep: Option<&[usize]>,
        drop: Option<&[usize]>,
    ) -> Result<usize, StructureError> {
        let count = self.frames.len();
        let kept_flags: Vec<bool> = match (keep, drop) {
            (Some(_), Some(_)) | (None, None) => return Err(StructureError::InvalidFrameSpec),
            (Some(keep), None) => {
                let set = frame_index_set(keep, count)?;
                (0..count).map(|i| set.contains(&i)).collect()
            }
            (None, Some(drop)) => {
                let set = frame_index_set(drop, count)?;
                (0..count).map(|i| !set.contains(&i)).collect()
            }
        };
        if !self.is_empty() && !kept_flags.iter().any(|&k| k) {
            return Err(StructureError::CannotDropAllFrames);
        }

        let old_active = self.active_frame;
        let mut new_active = 0;
        let mut new_frames = Vec::with_capacity(kept_flags.iter().filter(|&&k| k).count());
        for (i, frame) in self.frames.drain(..).enumerate() {
            if kept_flags[i] {
                if i == old_active {
                    new_active = new_frames.len();
                }
                new_frames.push(frame);
            }
        }
        let dropped = count - new_frames.len();
        self.frames = new_frames;
        self.active_frame = new_active;
        Ok(dropped)
    }

    /// Reassigns serial numbers sequentially starting from `start`, in
    /// structure order.
    pub fn renumber_serials(&mut self, start: i64) {
        for (offset, serial) in self.serial.iter_mut().enumerate() {
            *serial = start + offset as i64;
        }
    }

    fn check_mask(&self, mask: Option<&Mask>) -> Result<(), StructureError> {
        if let Some(mask) = mask {
            if mask.len() != self.len() {
                return Err(StructureError::MaskLengthMismatch {
                    mask_len: mask.len(),
                    atom_count: self.len(),
                });
            }
        }
        Ok(())
    }

    fn selected_indices(&self, mask: Option<&Mask>) -> Result<Vec<usize>, StructureError> {
        self.check_mask(mask)?;
        Ok(match mask {
            Some(mask) => mask.indices().collect(),
            None => (0..self.len()).collect(),
        })
    }

    /// Splices `other`'s rows flagged in `keep` into this structure at atom
    /// index `at`, aligning frame counts by repeating the last frame of the
    /// shorter side.
    fn splice_rows(&mut self, at: usize, other: &Structure, keep: &[bool]) {
        splice_kept(&mut self.serial, at, &other.serial, keep);
        splice_kept(&mut self.name, at, &other.name, keep);
        splice_kept(&mut self.resname, at, &other.resname, keep);
        splice_kept(&mut self.resid, at, &other.resid, keep);
        splice_kept(&mut self.chain, at, &other.chain, keep);
        splice_kept(&mut self.segid, at, &other.segid, keep);
        splice_kept(&mut self.insertion, at, &other.insertion, keep);
        splice_kept(&mut self.record, at, &other.record, keep);
        splice_kept(&mut self.element, at, &other.element, keep);

        let target = self.frames.len().max(other.frames.len()).max(1);
        if self.frames.is_empty() {
            self.frames = vec![Frame::default(); target];
        } else {
            while self.frames.len() < target {
                let last = self.frames.last().cloned().unwrap_or_default();
                self.frames.push(last);
            }
        }
        for (f, frame) in self.frames.iter_mut().enumerate() {
            let src = other.frames.get(f.min(other.frames.len().saturating_sub(1)));
            let incoming: Vec<Point3<f64>> = match src {
                Some(src) => src
                    .coords()
                    .iter()
                    .zip(keep)
                    .filter_map(|(p, &k)| k.then_some(*p))
                    .collect(),
                None => Vec::new(),
            };
            frame.coords_mut().splice(at..at, incoming);
        }
    }
}

fn frame_index_set(indices: &[usize], count: usize) -> Result<HashSet<usize>, StructureError> {
    let mut set = HashSet::with_capacity(indices.len());
    for &index in indices {
        if index >= count {
            return Err(StructureError::FrameIndexOutOfRange { index, count });
        }
        set.insert(index);
    }
    Ok(set)
}

fn retain_rows<T>(col: &mut Vec<T>, keep: &[bool]) {
    let mut idx = 0;
    col.retain(|_| {
        let kept = keep[idx];
        idx += 1;
        kept
    });
}

fn splice_kept<T: Clone>(col: &mut Vec<T>, at: usize, src: &[T], keep: &[bool]) {
    let incoming: Vec<T> = src
        .iter()
        .zip(keep)
        .filter_map(|(v, &k)| k.then(|| v.clone()))
        .collect();
    col.splice(at..at, incoming);
}

fn expand_ints(
    value: &SetValue,
    field: AtomField,
    count: usize,
) -> Result<Vec<i64>, StructureError> {
    match value {
        SetValue::Scalar(FieldValue::Int(v)) => Ok(vec![*v; count]),
        SetValue::PerAtom(FieldValues::Ints(vs)) => {
            check_shape(field, count, vs.len())?;
            Ok(vs.clone())
        }
        other => Err(type_mismatch(field, other)),
    }
}

fn expand_strs(
    value: &SetValue,
    field: AtomField,
    count: usize,
) -> Result<Vec<String>, StructureError> {
    match value {
        SetValue::Scalar(FieldValue::Str(v)) => Ok(vec![v.clone(); count]),
        SetValue::PerAtom(FieldValues::Strs(vs)) => {
            check_shape(field, count, vs.len())?;
            Ok(vs.clone())
        }
        other => Err(type_mismatch(field, other)),
    }
}

fn expand_records(
    value: &SetValue,
    field: AtomField,
    count: usize,
) -> Result<Vec<RecordKind>, StructureError> {
    match value {
        SetValue::Scalar(FieldValue::Record(v)) => Ok(vec![*v; count]),
        SetValue::PerAtom(FieldValues::Records(vs)) => {
            check_shape(field, count, vs.len())?;
            Ok(vs.clone())
        }
        other => Err(type_mismatch(field, other)),
    }
}

fn expand_coords(
    value: &SetValue,
    field: AtomField,
    count: usize,
) -> Result<Vec<Point3<f64>>, StructureError> {
    match value {
        SetValue::Scalar(FieldValue::Coord(v)) => Ok(vec![*v; count]),
        SetValue::PerAtom(FieldValues::Coords(vs)) => {
            check_shape(field, count, vs.len())?;
            Ok(vs.clone())
        }
        other => Err(type_mismatch(field, other)),
    }
}

fn check_shape(field: AtomField, expected: usize, actual: usize) -> Result<(), StructureError> {
    if expected != actual {
        return Err(StructureError::ShapeMismatch {
            field: field.as_str(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn type_mismatch(field: AtomField, value: &SetValue) -> StructureError {
    let given = match value {
        SetValue::Scalar(v) => v.kind(),
        SetValue::PerAtom(v) => v.kind(),
    };
    StructureError::TypeMismatch {
        field: field.as_str(),
        given,
    }
}
