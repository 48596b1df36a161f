//! Solver configuration attached to an assembled model.
//!
//! Nothing here solves anything: the configuration is carried through to the
//! exported model so the downstream solver can be driven from it.
//!
//! # Defaults
//!
//! - Static, linear analysis.
//! - Displacement convergence criterion, relative tolerance 1e-4 and absolute
//!   tolerance 1e-9 for both displacement and residual.
//! - 50 nonlinear iterations.
//! - Linear solver chosen by problem size: skyline LU below 100k DOFs,
//!   AMGCL above.

use serde::{Deserialize, Serialize};

/// Analysis type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    #[default]
    Linear,
    NonLinear,
}

impl AnalysisType {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisType::Linear => "linear",
            AnalysisType::NonLinear => "non_linear",
        }
    }
}

/// Convergence criterion for the nonlinear iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceCriterion {
    #[default]
    Displacement,
    Residual,
    And,
    Or,
}

impl ConvergenceCriterion {
    /// Criterion name as the solver spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            ConvergenceCriterion::Displacement => "displacement_criterion",
            ConvergenceCriterion::Residual => "residual_criterion",
            ConvergenceCriterion::And => "and_criterion",
            ConvergenceCriterion::Or => "or_criterion",
        }
    }
}

/// Linear solver selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolverType {
    /// Direct skyline LU factorization.
    SkylineLu,
    /// Algebraic multigrid preconditioned iterative solver.
    Amgcl,
    /// Automatically select based on problem size.
    #[default]
    Auto,
}

impl LinearSolverType {
    pub fn as_str(self) -> &'static str {
        match self {
            LinearSolverType::SkylineLu => "skyline_lu_factorization",
            LinearSolverType::Amgcl => "amgcl",
            LinearSolverType::Auto => "auto",
        }
    }
}

/// Solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub analysis_type: AnalysisType,
    pub convergence_criterion: ConvergenceCriterion,
    pub displacement_relative_tolerance: f64,
    pub displacement_absolute_tolerance: f64,
    pub residual_relative_tolerance: f64,
    pub residual_absolute_tolerance: f64,
    /// Maximum nonlinear iterations per step.
    pub max_iterations: usize,
    /// Linear solver to use.
    pub linear_solver: LinearSolverType,
    /// Problem size threshold for auto-selection (direct below, iterative above).
    pub auto_threshold: usize,
    /// Nodal results the solver should write.
    pub output_variables: Vec<String>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            analysis_type: AnalysisType::Linear,
            convergence_criterion: ConvergenceCriterion::Displacement,
            displacement_relative_tolerance: 1e-4,
            displacement_absolute_tolerance: 1e-9,
            residual_relative_tolerance: 1e-4,
            residual_absolute_tolerance: 1e-9,
            max_iterations: 50,
            linear_solver: LinearSolverType::Auto,
            auto_threshold: 100_000, // 100k DOFs
            output_variables: ["DISPLACEMENT", "REACTION", "CAUCHY_STRESS_TENSOR"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl SolverConfig {
    /// Config with both tolerance pairs set to the same values.
    pub fn with_tolerance(mut self, relative: f64, absolute: f64) -> Self {
        self.displacement_relative_tolerance = relative;
        self.residual_relative_tolerance = relative;
        self.displacement_absolute_tolerance = absolute;
        self.residual_absolute_tolerance = absolute;
        self
    }

    /// Concrete linear solver for a problem with `n_dofs` unknowns.
    ///
    /// `Auto` resolves to skyline LU below `auto_threshold` and AMGCL at or
    /// above it. An explicit choice is returned unchanged.
    pub fn resolve_linear_solver(&self, n_dofs: usize) -> LinearSolverType {
        match self.linear_solver {
            LinearSolverType::Auto if n_dofs < self.auto_threshold => LinearSolverType::SkylineLu,
            LinearSolverType::Auto => LinearSolverType::Amgcl,
            explicit => explicit,
        }
    }
}
