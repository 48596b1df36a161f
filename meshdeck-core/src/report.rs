//! Quality aggregation: summary statistics, score, grade and solver verdict.
//!
//! # Score
//!
//! Starts at 100. The problem ratio counts poor aspect ratios, poor
//! skewness and negative Jacobians (an element can count more than once)
//! over the element count:
//!
//! - ratio > 10%: -50, else ratio > 5%: -30, else ratio > 1%: -15
//! - mean aspect ratio > 5: -20
//! - mean skewness > 0.5: -20
//! - min Jacobian < 0.2: -20
//!
//! The score is clamped at 0.
//!
//! # Solver compatibility
//!
//! Independent of the grade: min Jacobian > 0.01, max aspect ratio < 100 and
//! max skewness < 0.95.

use crate::quality::{AcceptableRanges, QualityRecord, Range};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const MIN_SOLVER_JACOBIAN: f64 = 0.01;
const MAX_SOLVER_ASPECT_RATIO: f64 = 100.0;
const MAX_SOLVER_SKEWNESS: f64 = 0.95;

const MEAN_ASPECT_RATIO_LIMIT: f64 = 5.0;
const MEAN_SKEWNESS_LIMIT: f64 = 0.5;
const MIN_JACOBIAN_LIMIT: f64 = 0.2;

/// Five-level quality grade, also used for per-metric status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Unacceptable,
    Poor,
    Acceptable,
    Good,
    Excellent,
}

impl Grade {
    /// Grade for an overall score in [0, 100].
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::Excellent
        } else if score >= 75.0 {
            Grade::Good
        } else if score >= 60.0 {
            Grade::Acceptable
        } else if score >= 40.0 {
            Grade::Poor
        } else {
            Grade::Unacceptable
        }
    }

    /// Status of a single metric from the share of elements flagged for it.
    pub fn from_poor_fraction(fraction: f64) -> Self {
        if fraction <= 0.0 {
            Grade::Excellent
        } else if fraction <= 0.01 {
            Grade::Good
        } else if fraction <= 0.05 {
            Grade::Acceptable
        } else if fraction <= 0.10 {
            Grade::Poor
        } else {
            Grade::Unacceptable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Excellent => "excellent",
            Grade::Good => "good",
            Grade::Acceptable => "acceptable",
            Grade::Poor => "poor",
            Grade::Unacceptable => "unacceptable",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics of one metric across all elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Acceptable range, if the metric has one.
    pub acceptable_range: Option<Range>,
    /// Ids of elements flagged for this metric.
    pub poor_elements: Vec<usize>,
    pub status: Grade,
}

impl MetricSummary {
    fn from_values(
        values: &[f64],
        acceptable_range: Option<Range>,
        poor_elements: Vec<usize>,
    ) -> Self {
        let n = values.len();
        let status = if n == 0 {
            Grade::Excellent
        } else {
            Grade::from_poor_fraction(poor_elements.len() as f64 / n as f64)
        };
        if n == 0 {
            return Self {
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                std_dev: 0.0,
                acceptable_range,
                poor_elements,
                status,
            };
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

        Self {
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
            acceptable_range,
            poor_elements,
            status,
        }
    }
}

/// Per-metric summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummaries {
    pub aspect_ratio: MetricSummary,
    pub skewness: MetricSummary,
    pub jacobian: MetricSummary,
    pub orthogonality: MetricSummary,
    pub edge_ratio: MetricSummary,
    pub volume: MetricSummary,
}

/// Aggregated mesh quality verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_elements: usize,
    /// Element count per solver type name.
    pub element_type_counts: BTreeMap<String, usize>,
    pub metrics: MetricSummaries,
    pub n_poor_aspect_ratio: usize,
    pub n_poor_skewness: usize,
    pub n_poor_orthogonality: usize,
    pub n_poor_edge_ratio: usize,
    pub n_negative_jacobian: usize,
    pub n_zero_volume: usize,
    /// (poor aspect + poor skewness + negative Jacobian) / total elements.
    pub problem_ratio: f64,
    /// Overall score in [0, 100].
    pub overall_score: f64,
    pub grade: Grade,
    pub solver_compatible: bool,
    pub critical_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl QualityReport {
    /// Solver-compatible and graded acceptable or better.
    pub fn is_acceptable(&self) -> bool {
        self.solver_compatible && self.grade >= Grade::Acceptable
    }

    /// One-line description for logs and status bars.
    pub fn summary(&self) -> String {
        format!(
            "{} elements, score {:.1} ({}), solver-compatible: {}, {} critical issue(s)",
            self.total_elements,
            self.overall_score,
            self.grade,
            if self.solver_compatible { "yes" } else { "no" },
            self.critical_issues.len()
        )
    }
}

/// Aggregate quality records with the default acceptable ranges.
pub fn aggregate(records: &[QualityRecord]) -> QualityReport {
    aggregate_with_ranges(records, &AcceptableRanges::default())
}

/// Aggregate quality records.
///
/// `ranges` only annotates the summaries; outlier flags are taken from the
/// records as computed.
pub fn aggregate_with_ranges(records: &[QualityRecord], ranges: &AcceptableRanges) -> QualityReport {
    let n = records.len();

    let values = |f: fn(&QualityRecord) -> f64| -> Vec<f64> { records.iter().map(f).collect() };
    let flagged = |f: fn(&QualityRecord) -> bool| -> Vec<usize> {
        records
            .iter()
            .filter(|r| f(r))
            .map(|r| r.element_id)
            .collect()
    };

    let metrics = MetricSummaries {
        aspect_ratio: MetricSummary::from_values(
            &values(|r| r.aspect_ratio),
            Some(ranges.aspect_ratio),
            flagged(|r| r.is_poor_aspect_ratio),
        ),
        skewness: MetricSummary::from_values(
            &values(|r| r.skewness),
            Some(ranges.skewness),
            flagged(|r| r.is_poor_skewness),
        ),
        jacobian: MetricSummary::from_values(
            &values(|r| r.jacobian),
            None,
            flagged(|r| r.is_negative_jacobian),
        ),
        orthogonality: MetricSummary::from_values(
            &values(|r| r.orthogonality),
            Some(ranges.orthogonality),
            flagged(|r| r.is_poor_orthogonality),
        ),
        edge_ratio: MetricSummary::from_values(
            &values(|r| r.edge_ratio),
            Some(ranges.edge_ratio),
            flagged(|r| r.is_poor_edge_ratio),
        ),
        volume: MetricSummary::from_values(
            &values(|r| r.volume),
            None,
            flagged(|r| r.is_zero_volume),
        ),
    };

    let mut element_type_counts = BTreeMap::new();
    for r in records {
        *element_type_counts
            .entry(r.element_type.solver_name().to_string())
            .or_insert(0) += 1;
    }

    let n_poor_aspect_ratio = metrics.aspect_ratio.poor_elements.len();
    let n_poor_skewness = metrics.skewness.poor_elements.len();
    let n_poor_orthogonality = metrics.orthogonality.poor_elements.len();
    let n_poor_edge_ratio = metrics.edge_ratio.poor_elements.len();
    let n_negative_jacobian = metrics.jacobian.poor_elements.len();
    let n_zero_volume = metrics.volume.poor_elements.len();

    let problem_ratio = if n == 0 {
        0.0
    } else {
        (n_poor_aspect_ratio + n_poor_skewness + n_negative_jacobian) as f64 / n as f64
    };

    let overall_score = score(problem_ratio, &metrics);
    let grade = Grade::from_score(overall_score);

    let solver_compatible = n > 0
        && metrics.jacobian.min > MIN_SOLVER_JACOBIAN
        && metrics.aspect_ratio.max < MAX_SOLVER_ASPECT_RATIO
        && metrics.skewness.max < MAX_SOLVER_SKEWNESS;

    let mut report = QualityReport {
        total_elements: n,
        element_type_counts,
        metrics,
        n_poor_aspect_ratio,
        n_poor_skewness,
        n_poor_orthogonality,
        n_poor_edge_ratio,
        n_negative_jacobian,
        n_zero_volume,
        problem_ratio,
        overall_score,
        grade,
        solver_compatible,
        critical_issues: Vec::new(),
        recommendations: Vec::new(),
    };
    report.critical_issues = critical_issues(&report);
    report.recommendations = recommendations(&report);

    log::info!("mesh quality: {}", report.summary());
    report
}

fn score(problem_ratio: f64, metrics: &MetricSummaries) -> f64 {
    let mut score = 100.0;

    if problem_ratio > 0.10 {
        score -= 50.0;
    } else if problem_ratio > 0.05 {
        score -= 30.0;
    } else if problem_ratio > 0.01 {
        score -= 15.0;
    }

    if metrics.aspect_ratio.mean > MEAN_ASPECT_RATIO_LIMIT {
        score -= 20.0;
    }
    if metrics.skewness.mean > MEAN_SKEWNESS_LIMIT {
        score -= 20.0;
    }
    if metrics.jacobian.min < MIN_JACOBIAN_LIMIT {
        score -= 20.0;
    }

    f64::max(score, 0.0)
}

fn critical_issues(report: &QualityReport) -> Vec<String> {
    let m = &report.metrics;
    let mut issues = Vec::new();

    if report.total_elements == 0 {
        issues.push("mesh contains no elements".to_string());
        return issues;
    }
    if m.jacobian.min <= 0.0 {
        issues.push(format!(
            "negative Jacobian elements present ({} inverted or degenerate elements)",
            report.n_negative_jacobian
        ));
    } else if m.jacobian.min <= MIN_SOLVER_JACOBIAN {
        issues.push(format!(
            "near-degenerate elements: minimum Jacobian {:.4} is at or below {}",
            m.jacobian.min, MIN_SOLVER_JACOBIAN
        ));
    }
    if report.n_zero_volume > 0 {
        issues.push(format!(
            "zero-volume elements present ({} elements)",
            report.n_zero_volume
        ));
    }
    if m.aspect_ratio.max >= MAX_SOLVER_ASPECT_RATIO {
        issues.push(format!(
            "extreme aspect ratio: maximum {:.1} reaches the solver limit of {}",
            m.aspect_ratio.max, MAX_SOLVER_ASPECT_RATIO
        ));
    }
    if m.skewness.max >= MAX_SOLVER_SKEWNESS {
        issues.push(format!(
            "extreme skewness: maximum {:.3} reaches the solver limit of {}",
            m.skewness.max, MAX_SOLVER_SKEWNESS
        ));
    }
    issues
}

fn recommendations(report: &QualityReport) -> Vec<String> {
    let m = &report.metrics;
    let mut recs = Vec::new();

    if report.total_elements == 0 {
        recs.push("regenerate the mesh; no elements were produced".to_string());
        return recs;
    }
    if report.problem_ratio > 0.05 {
        recs.push(format!(
            "remesh regions with flagged elements ({:.1}% problem ratio)",
            report.problem_ratio * 100.0
        ));
    }
    if m.aspect_ratio.mean > MEAN_ASPECT_RATIO_LIMIT {
        recs.push("refine elongated elements to reduce the mean aspect ratio".to_string());
    }
    if m.skewness.mean > MEAN_SKEWNESS_LIMIT {
        recs.push("apply mesh smoothing or optimization to reduce skewness".to_string());
    }
    if m.jacobian.min < MIN_JACOBIAN_LIMIT {
        recs.push("inspect and repair distorted or inverted elements".to_string());
    }
    if report.n_poor_orthogonality > 0 {
        recs.push(format!(
            "improve orthogonality of {} elements",
            report.n_poor_orthogonality
        ));
    }
    if recs.is_empty() {
        recs.push("mesh quality is suitable for analysis".to_string());
    }
    recs
}
