//! Generic mesh input and conversion to solver nodes and elements.
//!
//! The meshing pipeline hands over three flat arrays:
//! - `vertices`: `x, y, z` per vertex
//! - `cells`: 0-based vertex indices, cell after cell
//! - `cell_types`: one shape code per cell
//!
//! Conversion assigns 1-based sequential ids to nodes and elements and shifts
//! connectivity to 1-based node ids, which is what the solver deck expects.

use crate::element::ElementType;
use crate::error::{Error, Result};
use crate::types::{Bounds, Point3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How cell connectivity is laid out in the `cells` array.
///
/// A conversion run uses exactly one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellLayout {
    /// Node counts come from the taxonomy: cells are packed back to back.
    #[default]
    Packed,
    /// VTK legacy style: every cell starts with its own node count.
    ///
    /// The prefix must match the taxonomy node count of the cell's type.
    VtkPrefixed,
}

/// Conversion options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Connectivity layout of the input.
    pub layout: CellLayout,
}

/// Mesh as produced by the upstream meshing pipeline. Borrowed, never modified.
#[derive(Debug, Clone, Copy)]
pub struct GenericMesh<'a> {
    /// Flat coordinates, `3 * n_vertices` long.
    pub vertices: &'a [f64],
    /// Flat 0-based connectivity.
    pub cells: &'a [u32],
    /// One shape code per cell.
    pub cell_types: &'a [u8],
}

impl<'a> GenericMesh<'a> {
    pub fn new(vertices: &'a [f64], cells: &'a [u32], cell_types: &'a [u8]) -> Self {
        Self {
            vertices,
            cells,
            cell_types,
        }
    }

    /// Number of vertices (`vertices.len() / 3`).
    pub fn n_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.cell_types.len()
    }
}

/// Solver node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// 1-based id.
    pub id: usize,
    pub coordinates: Point3,
}

/// Solver element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// 1-based id.
    pub id: usize,
    pub element_type: ElementType,
    /// 1-based node ids, `element_type.n_nodes()` long.
    pub connectivity: Vec<usize>,
}

/// Counters collected during conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub n_nodes: usize,
    pub n_elements: usize,
    /// Cells whose shape code was unknown and fell back to Tet4.
    pub n_fallback_cells: usize,
    /// Element count per solver type name.
    pub element_type_counts: BTreeMap<String, usize>,
}

/// Nodes and elements after conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertedMesh {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub stats: ConversionStats,
}

impl ConvertedMesh {
    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements.
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Node by 1-based id.
    pub fn node(&self, id: usize) -> Option<&Node> {
        id.checked_sub(1).and_then(|idx| self.nodes.get(idx))
    }

    /// Whether a 1-based node id exists.
    pub fn contains_node(&self, id: usize) -> bool {
        id >= 1 && id <= self.nodes.len()
    }

    /// Coordinates of an element's nodes, in connectivity order.
    pub fn element_coords(&self, element: &Element) -> Option<Vec<Point3>> {
        element
            .connectivity
            .iter()
            .map(|&id| self.node(id).map(|n| n.coordinates))
            .collect()
    }

    /// Bounding box of all nodes.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of(self.nodes.iter().map(|n| &n.coordinates))
    }
}

/// Convert a generic mesh into solver nodes and elements.
///
/// # Errors
///
/// - [`Error::MalformedMesh`] if the vertex array is not a multiple of 3, the
///   connectivity runs out before the last cell, entries are left over after
///   it, or a VTK prefix disagrees with the taxonomy.
/// - [`Error::InvalidNodeReference`] if a cell references a missing vertex.
///
/// Unknown shape codes are converted as 4-node tetrahedra with a warning.
pub fn convert(mesh: &GenericMesh<'_>, options: &ConversionOptions) -> Result<ConvertedMesh> {
    if mesh.vertices.len() % 3 != 0 {
        return Err(Error::MalformedMesh(format!(
            "vertex array length {} is not a multiple of 3",
            mesh.vertices.len()
        )));
    }

    let nodes: Vec<Node> = mesh
        .vertices
        .chunks_exact(3)
        .enumerate()
        .map(|(i, xyz)| Node {
            id: i + 1,
            coordinates: Point3::new(xyz[0], xyz[1], xyz[2]),
        })
        .collect();
    let n_nodes = nodes.len();

    let mut stats = ConversionStats {
        n_nodes,
        ..Default::default()
    };
    let mut elements = Vec::with_capacity(mesh.n_cells());
    let mut offset = 0usize;

    for (cell_idx, &code) in mesh.cell_types.iter().enumerate() {
        let element_type = match ElementType::from_code_strict(code) {
            Some(t) => t,
            None => {
                stats.n_fallback_cells += 1;
                log::warn!(
                    "cell {cell_idx} (element {}) has unknown shape code {code}, \
                     treating it as a 4-node tetrahedron",
                    cell_idx + 1
                );
                ElementType::Tet4
            }
        };
        let n = element_type.n_nodes();

        if options.layout == CellLayout::VtkPrefixed {
            let prefix = *mesh.cells.get(offset).ok_or_else(|| {
                Error::MalformedMesh(format!(
                    "connectivity ends before cell {cell_idx} (offset {offset})"
                ))
            })? as usize;
            if prefix != n {
                return Err(Error::MalformedMesh(format!(
                    "cell {cell_idx} declares {prefix} nodes, {element_type:?} requires {n}"
                )));
            }
            offset += 1;
        }

        let end = offset + n;
        if end > mesh.cells.len() {
            return Err(Error::MalformedMesh(format!(
                "cell {cell_idx} ({element_type:?}) needs connectivity up to {end}, array has {}",
                mesh.cells.len()
            )));
        }

        let mut connectivity = Vec::with_capacity(n);
        for &v in &mesh.cells[offset..end] {
            let v = v as usize;
            if v >= n_nodes {
                return Err(Error::InvalidNodeReference {
                    element: cell_idx + 1,
                    node: v,
                    n_nodes,
                });
            }
            connectivity.push(v + 1);
        }
        offset = end;

        *stats
            .element_type_counts
            .entry(element_type.solver_name().to_string())
            .or_default() += 1;
        elements.push(Element {
            id: cell_idx + 1,
            element_type,
            connectivity,
        });
    }

    if offset != mesh.cells.len() {
        return Err(Error::MalformedMesh(format!(
            "{} trailing connectivity entries after the last cell",
            mesh.cells.len() - offset
        )));
    }

    stats.n_elements = elements.len();
    log::debug!(
        "converted {} nodes and {} elements ({} fallback cells)",
        stats.n_nodes,
        stats.n_elements,
        stats.n_fallback_cells
    );

    Ok(ConvertedMesh {
        nodes,
        elements,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TET_VERTICES: [f64; 12] = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        0.0, 0.0, 1.0,
    ];

    #[test]
    fn test_convert_single_tet() {
        let mesh = GenericMesh::new(&TET_VERTICES, &[0, 1, 2, 3], &[10]);
        let converted = convert(&mesh, &ConversionOptions::default()).unwrap();

        assert_eq!(converted.n_nodes(), 4);
        assert_eq!(converted.n_elements(), 1);
        assert_eq!(converted.nodes[0].id, 1);
        assert_eq!(converted.nodes[3].coordinates, Point3::new(0.0, 0.0, 1.0));

        let elem = &converted.elements[0];
        assert_eq!(elem.id, 1);
        assert_eq!(elem.element_type, ElementType::Tet4);
        assert_eq!(elem.connectivity, vec![1, 2, 3, 4]);
        assert_eq!(converted.stats.element_type_counts["Element3D4N"], 1);
    }

    #[test]
    fn test_mixed_cells_packed() {
        // One triangle and one line sharing vertices
        let mesh = GenericMesh::new(&TET_VERTICES, &[0, 1, 2, 2, 3], &[5, 3]);
        let converted = convert(&mesh, &ConversionOptions::default()).unwrap();

        assert_eq!(converted.n_elements(), 2);
        assert_eq!(converted.elements[0].element_type, ElementType::Tri3);
        assert_eq!(converted.elements[1].element_type, ElementType::Line2);
        assert_eq!(converted.elements[1].id, 2);
        assert_eq!(converted.elements[1].connectivity, vec![3, 4]);
    }

    #[test]
    fn test_vtk_prefixed_layout() {
        let mesh = GenericMesh::new(&TET_VERTICES, &[3, 0, 1, 2, 2, 2, 3], &[5, 3]);
        let options = ConversionOptions {
            layout: CellLayout::VtkPrefixed,
        };
        let converted = convert(&mesh, &options).unwrap();
        assert_eq!(converted.elements[0].connectivity, vec![1, 2, 3]);
        assert_eq!(converted.elements[1].connectivity, vec![3, 4]);
    }

    #[test]
    fn test_vtk_prefix_mismatch() {
        let mesh = GenericMesh::new(&TET_VERTICES, &[4, 0, 1, 2, 3], &[5]);
        let options = ConversionOptions {
            layout: CellLayout::VtkPrefixed,
        };
        assert!(matches!(convert(&mesh, &options), Err(Error::MalformedMesh(_))));
    }

    #[test]
    fn test_connectivity_overrun() {
        let mesh = GenericMesh::new(&TET_VERTICES, &[0, 1, 2], &[10]);
        let result = convert(&mesh, &ConversionOptions::default());
        assert!(matches!(result, Err(Error::MalformedMesh(_))));
    }

    #[test]
    fn test_trailing_connectivity() {
        let mesh = GenericMesh::new(&TET_VERTICES, &[0, 1, 2, 3, 0], &[10]);
        let result = convert(&mesh, &ConversionOptions::default());
        assert!(matches!(result, Err(Error::MalformedMesh(_))));
    }

    #[test]
    fn test_invalid_node_index() {
        let mesh = GenericMesh::new(&TET_VERTICES, &[0, 1, 2, 7], &[10]);
        let result = convert(&mesh, &ConversionOptions::default());
        assert!(matches!(
            result,
            Err(Error::InvalidNodeReference {
                element: 1,
                node: 7,
                n_nodes: 4
            })
        ));
    }

    #[test]
    fn test_vertex_stride() {
        let mesh = GenericMesh::new(&[0.0, 1.0], &[], &[]);
        assert!(convert(&mesh, &ConversionOptions::default()).is_err());
    }

    #[test]
    fn test_unknown_code_falls_back() {
        let mesh = GenericMesh::new(&TET_VERTICES, &[0, 1, 2, 3], &[250]);
        let converted = convert(&mesh, &ConversionOptions::default()).unwrap();
        assert_eq!(converted.elements[0].element_type, ElementType::Tet4);
        assert_eq!(converted.stats.n_fallback_cells, 1);
    }

    #[test]
    fn test_node_lookup_and_bounds() {
        let mesh = GenericMesh::new(&TET_VERTICES, &[0, 1, 2, 3], &[10]);
        let converted = convert(&mesh, &ConversionOptions::default()).unwrap();

        assert!(converted.node(0).is_none());
        assert_eq!(converted.node(2).unwrap().coordinates, Point3::new(1.0, 0.0, 0.0));
        assert!(converted.contains_node(4));
        assert!(!converted.contains_node(5));

        let b = converted.bounds().unwrap();
        assert_eq!(b.min, [0.0, 0.0, 0.0]);
        assert_eq!(b.max, [1.0, 1.0, 1.0]);

        let coords = converted.element_coords(&converted.elements[0]).unwrap();
        assert_eq!(coords.len(), 4);
    }
}
