//! One-call driver: convert, assess, aggregate, assemble.

use crate::assembly::{assemble, AssemblyOptions, CanonicalModel};
use crate::boundary::BoundaryCondition;
use crate::error::{Error, Result};
use crate::export::{self, DeckOptions};
use crate::material::Material;
use crate::mesh::{convert, ConversionOptions, ConversionStats, GenericMesh};
use crate::quality::{self, QualityOptions, QualityRecord};
use crate::report::{aggregate_with_ranges, QualityReport};
use serde::{Deserialize, Serialize};

/// Options for every stage of [`run`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub conversion: ConversionOptions,
    pub quality: QualityOptions,
    pub assembly: AssemblyOptions,
    pub deck: DeckOptions,
    /// Refuse deck export when the mesh is not solver-compatible.
    pub require_solver_compatible: bool,
}

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub model: CanonicalModel,
    pub records: Vec<QualityRecord>,
    pub report: QualityReport,
    pub stats: ConversionStats,
    deck_options: DeckOptions,
    require_solver_compatible: bool,
}

impl PipelineOutput {
    /// Solver deck for the model.
    ///
    /// # Errors
    ///
    /// [`Error::NotSolverReady`] when solver compatibility is required and the
    /// quality report denies it.
    pub fn deck(&self) -> Result<String> {
        if self.require_solver_compatible && !self.report.solver_compatible {
            let reason = if self.report.critical_issues.is_empty() {
                self.report.summary()
            } else {
                self.report.critical_issues.join("; ")
            };
            return Err(Error::NotSolverReady(reason));
        }
        export::to_deck(&self.model, &self.deck_options)
    }

    pub fn json(&self) -> Result<String> {
        export::to_json(&self.model)
    }
}

/// Run the whole conversion on a generic mesh.
///
/// Quality problems never fail the run; they are reported in
/// [`PipelineOutput::report`].
pub fn run(
    mesh: &GenericMesh<'_>,
    materials: &[Material],
    boundary_conditions: &[BoundaryCondition],
    options: &PipelineOptions,
) -> Result<PipelineOutput> {
    let converted = convert(mesh, &options.conversion)?;
    let records = quality::compute(&converted.nodes, &converted.elements, &options.quality)?;
    let report = aggregate_with_ranges(&records, &options.quality.ranges);
    let model = assemble(
        &converted.nodes,
        &converted.elements,
        materials,
        boundary_conditions,
        &options.assembly,
    )?;

    Ok(PipelineOutput {
        model,
        records,
        report,
        stats: converted.stats,
        deck_options: options.deck,
        require_solver_compatible: options.require_solver_compatible,
    })
}
