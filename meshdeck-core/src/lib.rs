//! Meshdeck Core - mesh-to-solver conversion and quality assessment
//!
//! Turns a generic tessellated mesh into a solver-ready finite element model:
//! - Element taxonomy mapping VTK shape codes to solver element types
//! - Conversion of flat vertex/connectivity arrays into 1-based nodes and elements
//! - Per-element quality metrics computed in parallel using Rayon
//! - Aggregated quality report with score, grade and solver-compatibility verdict
//! - Model assembly with subdomains, materials and boundary conditions
//! - JSON and solver deck export
//!
//! # Architecture
//!
//! - [`ElementType`]: taxonomy entry, dispatching to a [`element::ShapeGeometry`] kernel
//! - [`mesh::convert`]: [`GenericMesh`] to [`ConvertedMesh`]
//! - [`quality::compute`] and [`report::aggregate`]: metrics and verdict
//! - [`assembly::assemble`]: [`CanonicalModel`]
//! - [`export`]: JSON and deck writers
//! - [`pipeline::run`]: all of the above in one call

pub mod types;
pub mod element;
pub mod mesh;
pub mod quality;
pub mod report;
pub mod material;
pub mod boundary;
pub mod solver;
pub mod assembly;
pub mod export;
pub mod pipeline;
pub mod error;

pub use types::{Bounds, Point3};
pub use element::{ElementType, Shape};
pub use mesh::{ConvertedMesh, GenericMesh};
pub use quality::QualityRecord;
pub use report::{Grade, QualityReport};
pub use material::Material;
pub use boundary::{BoundaryCondition, BoundaryKind};
pub use solver::SolverConfig;
pub use assembly::CanonicalModel;
pub use error::{Error, Result};
