use nalgebra::{Matrix3, Point3, Vector3};

/// A single coordinate frame: one 3-vector per atom, index-aligned with the
/// attribute columns of the owning structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    coords: Vec<Point3<f64>>,
}

impl Frame {
    pub fn new(coords: Vec<Point3<f64>>) -> Self {
        Self { coords }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn coords(&self) -> &[Point3<f64>] {
        &self.coords
    }

    pub(crate) fn coords_mut(&mut self) -> &mut Vec<Point3<f64>> {
        &mut self.coords
    }

    /// Adds `offset` to every coordinate of the frame.
    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for p in &mut self.coords {
            *p += offset;
        }
    }

    /// Applies `coords' = matrix * (coords - center) + center` to every coordinate.
    pub fn rotate(&mut self, matrix: &Matrix3<f64>, center: &Point3<f64>) {
        for p in &mut self.coords {
            let rotated = matrix * (*p - center);
            *p = center + rotated;
        }
    }

    /// Keeps only the coordinates at the given row indices, in order.
    pub(crate) fn keep_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.coords.len());
        let mut idx = 0;
        self.coords.retain(|_| {
            let kept = keep[idx];
            idx += 1;
            kept
        });
    }
}
