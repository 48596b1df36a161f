//! Boundary condition records.
//!
//! Conditions are supplied by the caller and passed through to the model.
//! The assembler only checks that every applied node exists.

use serde::{Deserialize, Serialize};

/// Physical quantity a boundary condition prescribes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Prescribed displacement (Dirichlet).
    Displacement,
    /// Point force (Neumann).
    Force,
    /// Distributed surface pressure.
    Pressure,
    /// Prescribed flow or water pressure head.
    Flow,
    Temperature,
}

impl BoundaryKind {
    /// Solver variable the condition acts on.
    pub fn variable_name(self) -> &'static str {
        match self {
            BoundaryKind::Displacement => "DISPLACEMENT",
            BoundaryKind::Force => "POINT_LOAD",
            BoundaryKind::Pressure => "POSITIVE_FACE_PRESSURE",
            BoundaryKind::Flow => "WATER_PRESSURE",
            BoundaryKind::Temperature => "TEMPERATURE",
        }
    }
}

/// A boundary condition applied to a set of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub id: u32,
    pub name: String,
    pub kind: BoundaryKind,
    /// 1-based node ids.
    pub applied_node_ids: Vec<usize>,
    /// Prescribed values; meaning depends on `kind`.
    pub values: Vec<f64>,
    /// Direction the values act in (unit vector for loads, component mask
    /// for displacements).
    pub direction: [f64; 3],
    pub is_fixed: bool,
    /// Time the condition switches on. `None` means from the start.
    pub activation_time: Option<f64>,
    /// Time the condition switches off. `None` means never.
    pub deactivation_time: Option<f64>,
    /// First construction stage the condition belongs to.
    pub stage_index: Option<usize>,
}

impl BoundaryCondition {
    /// Fully fixed displacement on `nodes`.
    pub fn fixed_displacement(id: u32, name: impl Into<String>, nodes: Vec<usize>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: BoundaryKind::Displacement,
            applied_node_ids: nodes,
            values: vec![0.0; 3],
            direction: [1.0, 1.0, 1.0],
            is_fixed: true,
            activation_time: None,
            deactivation_time: None,
            stage_index: None,
        }
    }

    /// Point force of `magnitude` along `direction` on each of `nodes`.
    pub fn force(
        id: u32,
        name: impl Into<String>,
        nodes: Vec<usize>,
        magnitude: f64,
        direction: [f64; 3],
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: BoundaryKind::Force,
            applied_node_ids: nodes,
            values: direction.iter().map(|d| d * magnitude).collect(),
            direction,
            is_fixed: false,
            activation_time: None,
            deactivation_time: None,
            stage_index: None,
        }
    }

    /// Uniform pressure on the face spanned by `nodes`.
    pub fn pressure(id: u32, name: impl Into<String>, nodes: Vec<usize>, pressure: f64) -> Self {
        Self {
            id,
            name: name.into(),
            kind: BoundaryKind::Pressure,
            applied_node_ids: nodes,
            values: vec![pressure],
            direction: [0.0, 0.0, -1.0],
            is_fixed: false,
            activation_time: None,
            deactivation_time: None,
            stage_index: None,
        }
    }

    /// Restrict the condition to construction stage `stage` onwards.
    pub fn in_stage(mut self, stage: usize) -> Self {
        self.stage_index = Some(stage);
        self
    }

    /// Active between the two times (either bound may be open).
    pub fn between(mut self, activation: Option<f64>, deactivation: Option<f64>) -> Self {
        self.activation_time = activation;
        self.deactivation_time = deactivation;
        self
    }

    /// Whether the condition is in force at `time`.
    ///
    /// The activation bound is inclusive, the deactivation bound exclusive.
    pub fn is_active_at(&self, time: f64) -> bool {
        self.activation_time.map_or(true, |t| time >= t)
            && self.deactivation_time.map_or(true, |t| time < t)
    }

    /// Whether the condition applies in construction stage `stage`.
    pub fn is_active_in_stage(&self, stage: usize) -> bool {
        self.stage_index.map_or(true, |s| s <= stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_displacement() {
        let bc = BoundaryCondition::fixed_displacement(1, "base", vec![1, 2, 3]);
        assert_eq!(bc.kind, BoundaryKind::Displacement);
        assert!(bc.is_fixed);
        assert_eq!(bc.values, vec![0.0; 3]);
    }

    #[test]
    fn test_force_components() {
        let bc = BoundaryCondition::force(2, "load", vec![8], 1000.0, [0.0, 0.0, -1.0]);
        assert_relative_eq!(bc.values[2], -1000.0);
        assert_eq!(bc.kind.variable_name(), "POINT_LOAD");
    }

    #[test]
    fn test_activation_window() {
        let bc = BoundaryCondition::pressure(3, "surcharge", vec![5, 6, 7], 20e3)
            .between(Some(1.0), Some(3.0));
        assert!(!bc.is_active_at(0.5));
        assert!(bc.is_active_at(1.0));
        assert!(bc.is_active_at(2.9));
        assert!(!bc.is_active_at(3.0));

        let open = BoundaryCondition::pressure(4, "always", vec![1], 1.0);
        assert!(open.is_active_at(-1e9));
    }

    #[test]
    fn test_stage_membership() {
        let bc = BoundaryCondition::fixed_displacement(1, "strut", vec![4]).in_stage(2);
        assert!(!bc.is_active_in_stage(1));
        assert!(bc.is_active_in_stage(2));
        assert!(bc.is_active_in_stage(5));
        assert!(BoundaryCondition::fixed_displacement(2, "base", vec![1]).is_active_in_stage(0));
    }
}
