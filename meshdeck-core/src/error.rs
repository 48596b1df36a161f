//! Error types for mesh conversion and model assembly.
//!
//! Quality problems (poor, inverted or zero-volume elements) are never
//! reported through this type. They are data in the quality report.

use thiserror::Error;

/// Result type alias using the crate Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting, assembling or exporting a model.
#[derive(Error, Debug)]
pub enum Error {
    /// Inconsistent input arrays (vertex stride, connectivity overrun, prefix mismatch).
    #[error("malformed mesh: {0}")]
    MalformedMesh(String),

    /// Element connectivity referencing a node that does not exist.
    #[error("element {element} references node {node}, but the mesh has {n_nodes} nodes")]
    InvalidNodeReference {
        element: usize,
        node: usize,
        n_nodes: usize,
    },

    /// Boundary condition applied to a node id outside the converted node set.
    #[error("boundary condition {condition} references unknown node id {node}")]
    UnknownBoundaryNode { condition: u32, node: usize },

    /// Model assembly errors.
    #[error("assembly error: {0}")]
    Assembly(String),

    /// Invalid material properties.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// Export refused because the mesh failed the solver-compatibility gate.
    #[error("mesh is not solver-ready: {0}")]
    NotSolverReady(String),

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Text formatting errors while writing the deck.
    #[error("format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}
