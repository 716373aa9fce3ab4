//! In-memory mesh with named per-point fields and per-cell component masks.
//!
//! The mesh is filled by an external loader. Everything in this crate either
//! reads it through a shared reference or works on a deep clone, so the
//! canonical loaded instance is never mutated by an extraction.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};

use crate::errors::PostError;
use crate::field::FieldArray;
use crate::geometry::Bounds;

/// A point cloud with connectivity, point fields and boolean cell masks.
///
/// `Clone` produces a fully independent copy: every array is an owned buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    /// Point coordinates, shape `(N, 3)`.
    points: Array2<f64>,
    /// Point indices of every cell.
    cells: Vec<Vec<usize>>,
    /// Named per-point fields, each with `N` rows.
    point_data: BTreeMap<String, FieldArray>,
    /// Named boolean cell masks in insertion order.
    cell_masks: Vec<(String, Array1<bool>)>,
}

impl Mesh {
    /// Create a mesh from an `(N, 3)` coordinate array with no cells or fields.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidField`] when `points` is not three columns wide.
    pub fn new(points: Array2<f64>) -> Result<Self, PostError> {
        if points.ncols() != 3 {
            return Err(PostError::InvalidField {
                name: "points".to_string(),
                reason: format!("expected 3 columns, found {}", points.ncols()),
            });
        }
        Ok(Self {
            points,
            cells: Vec::new(),
            point_data: BTreeMap::new(),
            cell_masks: Vec::new(),
        })
    }

    /// Attach cell connectivity to the mesh.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidField`] when a cell references a point that does not exist.
    pub fn with_cells(mut self, cells: Vec<Vec<usize>>) -> Result<Self, PostError> {
        let n = self.point_count();
        if let Some((cell, &point)) = cells
            .iter()
            .enumerate()
            .find_map(|(idx, cell)| cell.iter().find(|&&p| p >= n).map(|p| (idx, p)))
        {
            return Err(PostError::InvalidField {
                name: "cells".to_string(),
                reason: format!("cell {cell} references point {point} but the mesh has {n} points"),
            });
        }
        self.cells = cells;
        self.cell_masks.clear();
        Ok(self)
    }

    /// Number of points in the mesh.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.nrows()
    }

    /// Number of cells in the mesh.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Point coordinates, shape `(N, 3)`.
    #[must_use]
    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    /// Cell connectivity.
    #[must_use]
    pub fn cells(&self) -> &[Vec<usize>] {
        &self.cells
    }

    /// Axis-aligned bounds of the points, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of_points(&self.points)
    }

    /// Look up a point field by name.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::FieldNotFound`] when the field is absent.
    pub fn field(&self, name: &str) -> Result<&FieldArray, PostError> {
        self.point_data
            .get(name)
            .ok_or_else(|| PostError::FieldNotFound(name.to_string()))
    }

    /// Return `true` when a point field with this name exists.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.point_data.contains_key(name)
    }

    /// Names of all point fields in sorted order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.point_data.keys().map(String::as_str).collect()
    }

    /// Store a point field, replacing any field with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::FieldLengthMismatch`] when the field does not have one row per point.
    pub fn set_field(
        &mut self,
        name: impl Into<String>,
        field: impl Into<FieldArray>,
    ) -> Result<(), PostError> {
        let name = name.into();
        let field = field.into();
        if field.len() != self.point_count() {
            return Err(PostError::FieldLengthMismatch {
                name,
                len: field.len(),
                points: self.point_count(),
            });
        }
        self.point_data.insert(name, field);
        Ok(())
    }

    /// Store a boolean cell mask marking the cells of one component.
    ///
    /// Re-using a name replaces the mask but keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::CellMaskLengthMismatch`] when the mask does not have one entry per cell.
    pub fn set_cell_mask(
        &mut self,
        name: impl Into<String>,
        mask: Array1<bool>,
    ) -> Result<(), PostError> {
        let name = name.into();
        if mask.len() != self.cell_count() {
            return Err(PostError::CellMaskLengthMismatch {
                name,
                len: mask.len(),
                cells: self.cell_count(),
            });
        }
        match self.cell_masks.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = mask,
            None => self.cell_masks.push((name, mask)),
        }
        Ok(())
    }

    /// Look up a cell mask by name.
    #[must_use]
    pub fn cell_mask(&self, name: &str) -> Option<&Array1<bool>> {
        self.cell_masks
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, mask)| mask)
    }

    /// Names of the component masks in the order they were added.
    #[must_use]
    pub fn component_names(&self) -> Vec<&str> {
        self.cell_masks.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Extract the cells of one component into a new mesh.
    ///
    /// `number` is 1-based and indexes [`Mesh::component_names`]. Only the points
    /// referenced by the selected cells are kept; every point field and every
    /// cell mask is sliced to match.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::NoComponentMasks`] when the mesh carries no masks and
    /// [`PostError::InvalidComponent`] when `number` is out of range.
    pub fn extract_component(&self, number: usize) -> Result<Mesh, PostError> {
        if self.cell_masks.is_empty() {
            return Err(PostError::NoComponentMasks);
        }
        let available = self.cell_masks.len();
        if number < 1 || number > available {
            return Err(PostError::InvalidComponent {
                index: number,
                available,
            });
        }
        let (name, mask) = &self.cell_masks[number - 1];
        let selected: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(idx, &keep)| keep.then_some(idx))
            .collect();

        let mut used = vec![false; self.point_count()];
        for &cell in &selected {
            for &point in &self.cells[cell] {
                used[point] = true;
            }
        }
        let kept: Vec<usize> = used
            .iter()
            .enumerate()
            .filter_map(|(idx, &keep)| keep.then_some(idx))
            .collect();
        let mut remap = vec![usize::MAX; self.point_count()];
        for (new_idx, &old_idx) in kept.iter().enumerate() {
            remap[old_idx] = new_idx;
        }

        let cells = selected
            .iter()
            .map(|&cell| self.cells[cell].iter().map(|&p| remap[p]).collect())
            .collect();
        let point_data = self
            .point_data
            .iter()
            .map(|(field_name, field)| (field_name.clone(), field.select_rows(&kept)))
            .collect();
        let cell_masks = self
            .cell_masks
            .iter()
            .map(|(mask_name, mask)| (mask_name.clone(), mask.select(Axis(0), &selected)))
            .collect();

        log::debug!(
            "extracted component `{name}`: {} cells, {} points",
            selected.len(),
            kept.len()
        );

        Ok(Mesh {
            points: self.points.select(Axis(0), &kept),
            cells,
            point_data,
            cell_masks,
        })
    }
}
