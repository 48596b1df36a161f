//! Model assembly.
//!
//! Combines converted nodes and elements with caller-supplied materials and
//! boundary conditions into one [`CanonicalModel`]. Elements are grouped into
//! subdomains, one per material, and every boundary node is checked against
//! the node set.
//!
//! # Subdomain strategies
//!
//! - [`SubdomainStrategy::ContiguousBlocks`]: elements in id order are cut
//!   into `materials.len()` equal blocks, one per material in declaration
//!   order. The last block takes the remainder.
//! - [`SubdomainStrategy::ByElement`]: an explicit material id per element.

use crate::boundary::BoundaryCondition;
use crate::error::{Error, Result};
use crate::material::Material;
use crate::mesh::{Element, Node};
use crate::solver::SolverConfig;
use crate::types::Bounds;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Property id used for elements outside every subdomain.
pub const DEFAULT_PROPERTY_ID: u32 = 1;

/// Physics of the analysis the model is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    #[default]
    Static,
    /// Coupled displacement and pore pressure.
    Consolidation,
    Seepage,
    Dynamic,
}

impl AnalysisKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::Static => "static",
            AnalysisKind::Consolidation => "consolidation",
            AnalysisKind::Seepage => "seepage",
            AnalysisKind::Dynamic => "dynamic",
        }
    }
}

/// How elements are assigned to materials.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubdomainStrategy {
    /// Equal contiguous blocks in element-id order.
    #[default]
    ContiguousBlocks,
    /// Material id for every element, in element order.
    ByElement(Vec<u32>),
}

/// Assembly options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    pub model_name: String,
    pub analysis_type: AnalysisKind,
    /// Spatial dimension of the model (2 or 3).
    pub dimension: u8,
    pub subdomains: SubdomainStrategy,
    pub solver: SolverConfig,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            model_name: "Structure".to_string(),
            analysis_type: AnalysisKind::Static,
            dimension: 3,
            subdomains: SubdomainStrategy::ContiguousBlocks,
            solver: SolverConfig::default(),
        }
    }
}

/// A group of elements sharing one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdomain {
    /// 1-based, in material declaration order.
    pub id: u32,
    pub name: String,
    pub material_id: u32,
    pub element_ids: Vec<usize>,
}

/// Model metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub dimension: u8,
    pub analysis_type: AnalysisKind,
    pub n_nodes: usize,
    pub n_elements: usize,
    /// `None` for a model without nodes.
    pub bounds: Option<Bounds>,
}

/// Complete model ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalModel {
    pub info: ModelInfo,
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub materials: Vec<Material>,
    pub boundary_conditions: Vec<BoundaryCondition>,
    pub subdomains: Vec<Subdomain>,
    pub solver: SolverConfig,
}

impl CanonicalModel {
    /// Property id of an element: its subdomain's material id, or
    /// [`DEFAULT_PROPERTY_ID`] when no subdomain holds it.
    pub fn property_of(&self, element_id: usize) -> u32 {
        self.subdomains
            .iter()
            .find(|s| s.element_ids.contains(&element_id))
            .map_or(DEFAULT_PROPERTY_ID, |s| s.material_id)
    }

    pub fn material(&self, material_id: u32) -> Option<&Material> {
        self.materials.iter().find(|m| m.material_id == material_id)
    }

    /// Number of degrees of freedom for a displacement analysis.
    pub fn n_dofs(&self) -> usize {
        self.nodes.len() * usize::from(self.info.dimension)
    }
}

/// Assemble a model from converted nodes and elements.
///
/// # Errors
///
/// - [`Error::InvalidMaterial`] if a material fails validation.
/// - [`Error::Assembly`] for duplicate material ids, an element of higher
///   dimension than the model, or a bad explicit material assignment.
/// - [`Error::InvalidNodeReference`] if an element references a missing node.
/// - [`Error::UnknownBoundaryNode`] if a boundary condition references a
///   missing node.
///
/// # Example
///
/// ```
/// use meshdeck_core::assembly::{assemble, AssemblyOptions};
/// use meshdeck_core::boundary::BoundaryCondition;
/// use meshdeck_core::material::Material;
/// use meshdeck_core::mesh::{convert, ConversionOptions, GenericMesh};
///
/// let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
/// let mesh = GenericMesh::new(&vertices, &[0, 1, 2, 3], &[10]);
/// let converted = convert(&mesh, &ConversionOptions::default()).unwrap();
///
/// let materials = [Material::dense_sand(1)];
/// let bcs = [BoundaryCondition::fixed_displacement(1, "base", vec![1, 2, 3])];
/// let model = assemble(
///     &converted.nodes,
///     &converted.elements,
///     &materials,
///     &bcs,
///     &AssemblyOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(model.subdomains[0].element_ids, vec![1]);
/// ```
pub fn assemble(
    nodes: &[Node],
    elements: &[Element],
    materials: &[Material],
    boundary_conditions: &[BoundaryCondition],
    options: &AssemblyOptions,
) -> Result<CanonicalModel> {
    if !(2..=3).contains(&options.dimension) {
        return Err(Error::Assembly(format!(
            "model dimension must be 2 or 3, got {}",
            options.dimension
        )));
    }

    let mut material_ids = HashSet::new();
    for material in materials {
        material.validate()?;
        if !material_ids.insert(material.material_id) {
            return Err(Error::Assembly(format!(
                "duplicate material id {}",
                material.material_id
            )));
        }
    }

    let node_ids: HashSet<usize> = nodes.iter().map(|n| n.id).collect();
    for element in elements {
        if element.element_type.dimension() > usize::from(options.dimension) {
            return Err(Error::Assembly(format!(
                "element {} is {} but the model is {}D",
                element.id, element.element_type, options.dimension
            )));
        }
        if let Some(&node) = element.connectivity.iter().find(|id| !node_ids.contains(id)) {
            return Err(Error::InvalidNodeReference {
                element: element.id,
                node,
                n_nodes: nodes.len(),
            });
        }
    }

    for bc in boundary_conditions {
        if let Some(&node) = bc.applied_node_ids.iter().find(|id| !node_ids.contains(id)) {
            return Err(Error::UnknownBoundaryNode {
                condition: bc.id,
                node,
            });
        }
    }

    let subdomains = match &options.subdomains {
        SubdomainStrategy::ContiguousBlocks => contiguous_blocks(elements, materials),
        SubdomainStrategy::ByElement(assignment) => by_element(elements, materials, assignment)?,
    };
    log::debug!(
        "assembled {} nodes, {} elements, {} subdomains, {} boundary conditions",
        nodes.len(),
        elements.len(),
        subdomains.len(),
        boundary_conditions.len()
    );

    let info = ModelInfo {
        name: options.model_name.clone(),
        dimension: options.dimension,
        analysis_type: options.analysis_type,
        n_nodes: nodes.len(),
        n_elements: elements.len(),
        bounds: Bounds::of(nodes.iter().map(|n| &n.coordinates)),
    };

    Ok(CanonicalModel {
        info,
        nodes: nodes.to_vec(),
        elements: elements.to_vec(),
        materials: materials.to_vec(),
        boundary_conditions: boundary_conditions.to_vec(),
        subdomains,
        solver: options.solver.clone(),
    })
}

fn subdomain(index: usize, material: &Material, element_ids: Vec<usize>) -> Subdomain {
    Subdomain {
        id: index as u32 + 1,
        name: format!("Subdomain_{}", material.material_id),
        material_id: material.material_id,
        element_ids,
    }
}

fn sorted_ids(elements: &[Element]) -> Vec<usize> {
    let mut ids: Vec<usize> = elements.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    ids
}

fn contiguous_blocks(elements: &[Element], materials: &[Material]) -> Vec<Subdomain> {
    if materials.is_empty() {
        return Vec::new();
    }
    let ids = sorted_ids(elements);
    let block = ids.len() / materials.len();
    let last = materials.len() - 1;

    materials
        .iter()
        .enumerate()
        .map(|(i, material)| {
            let start = i * block;
            let end = if i == last { ids.len() } else { start + block };
            subdomain(i, material, ids[start..end].to_vec())
        })
        .collect()
}

fn by_element(elements: &[Element], materials: &[Material], assignment: &[u32]) -> Result<Vec<Subdomain>> {
    if assignment.len() != elements.len() {
        return Err(Error::Assembly(format!(
            "material assignment has {} entries for {} elements",
            assignment.len(),
            elements.len()
        )));
    }

    let mut subdomains: Vec<Subdomain> = materials
        .iter()
        .enumerate()
        .map(|(i, material)| subdomain(i, material, Vec::new()))
        .collect();

    for (element, &material_id) in elements.iter().zip(assignment) {
        let target = subdomains
            .iter_mut()
            .find(|s| s.material_id == material_id)
            .ok_or_else(|| {
                Error::Assembly(format!(
                    "element {} assigned to unknown material {}",
                    element.id, material_id
                ))
            })?;
        target.element_ids.push(element.id);
    }

    for s in &mut subdomains {
        s.element_ids.sort_unstable();
    }
    Ok(subdomains)
}
