//! Depth/width of cut optimizer
//!
//! Sweeps a grid of (doc, woc) pairs around a base calculator, keeps the
//! candidates accepted by a [`Constraint`] and returns the one with the
//! highest material removal rate.

use serde::{Deserialize, Serialize};

use crate::calculator::{
    CalculatorError, Cutter, FeedsAndSpeeds, FeedsAndSpeedsCalculator, Result,
};

/// Samples per axis used by the default sweeps
pub const DEFAULT_SAMPLES: usize = 100;

/// Evenly spaced samples from `min` to `max`, both ends included
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanRange {
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl ScanRange {
    pub fn new(min: f64, max: f64, samples: usize) -> Self {
        Self { min, max, samples }
    }

    /// A single sample at `value`
    pub fn fixed(value: f64) -> Self {
        Self::new(value, value, 1)
    }

    /// 0.001" down to three diameters deep
    pub fn doc_sweep(cutter: &Cutter) -> Self {
        Self::new(0.001, 3.0 * cutter.diameter, DEFAULT_SAMPLES)
    }

    /// 5% stepover up to a full slot
    pub fn woc_sweep(cutter: &Cutter) -> Self {
        Self::new(0.05 * cutter.diameter, cutter.diameter, DEFAULT_SAMPLES)
    }

    /// A range needs finite ends, `min <= max`, and at least two samples
    /// unless it is pinned to a single value.
    pub fn validate(&self, axis: &'static str) -> Result<()> {
        let reason = if !self.min.is_finite() || !self.max.is_finite() {
            Some("bounds must be finite".to_string())
        } else if self.min > self.max {
            Some(format!("min {} is greater than max {}", self.min, self.max))
        } else if self.samples == 0 {
            Some("needs at least one sample".to_string())
        } else if self.samples == 1 && self.min != self.max {
            Some(format!(
                "a single sample cannot cover {}..{}",
                self.min, self.max
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CalculatorError::InvalidRange { axis, reason }),
            None => Ok(()),
        }
    }

    /// Sample values, `min + (max - min)·i/(n - 1)`
    pub fn values(&self) -> Vec<f64> {
        if self.samples <= 1 {
            return vec![self.min; self.samples];
        }

        let last = self.samples - 1;
        let step = (self.max - self.min) / last as f64;
        (0..self.samples)
            .map(|i| if i == last { self.max } else { self.min + step * i as f64 })
            .collect()
    }
}

/// Predicate deciding whether a candidate is safe enough to keep
pub trait Constraint {
    fn accepts(&self, candidate: &FeedsAndSpeeds) -> bool;
}

impl<F> Constraint for F
where
    F: Fn(&FeedsAndSpeeds) -> bool,
{
    fn accepts(&self, candidate: &FeedsAndSpeeds) -> bool {
        self(candidate)
    }
}

/// Open interval; a missing end is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<f64>,
}

impl Bounds {
    pub fn between(above: f64, below: f64) -> Self {
        Self {
            above: Some(above),
            below: Some(below),
        }
    }

    pub fn below(below: f64) -> Self {
        Self {
            above: None,
            below: Some(below),
        }
    }

    pub fn above(above: f64) -> Self {
        Self {
            above: Some(above),
            below: None,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.above.map_or(true, |lo| value > lo) && self.below.map_or(true, |hi| value < hi)
    }
}

/// Limits on the safety margins of a candidate.
///
/// The default targets a quarter of the machine force and router power,
/// 10% of the acceptable deflection and a feedrate under 180 in/min.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub machine_force_percent: Bounds,
    #[serde(default)]
    pub available_power_percent: Bounds,
    #[serde(default)]
    pub max_deflection_percent: Bounds,
    #[serde(default)]
    pub feedrate: Bounds,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            machine_force_percent: Bounds::between(0.24, 0.25),
            available_power_percent: Bounds::between(0.24, 0.25),
            max_deflection_percent: Bounds::below(0.1),
            feedrate: Bounds::below(180.0),
        }
    }
}

impl Constraint for Constraints {
    fn accepts(&self, candidate: &FeedsAndSpeeds) -> bool {
        self.machine_force_percent
            .contains(candidate.machine_force_percent)
            && self
                .available_power_percent
                .contains(candidate.available_power_percent)
            && self
                .max_deflection_percent
                .contains(candidate.max_deflection_percent)
            && self.feedrate.contains(candidate.feedrate)
    }
}

/// Outcome of a grid search. `best` is `None` when no candidate passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub evaluated: usize,
    pub accepted: usize,
    pub best: Option<FeedsAndSpeeds>,
}

/// Find the (doc, woc) pair with the highest material removal rate that
/// satisfies `constraint`.
///
/// Candidates are visited doc-major, woc-minor; on equal MRR the first one
/// visited wins.
pub fn optimize<C>(
    base: &FeedsAndSpeedsCalculator,
    doc: &ScanRange,
    woc: &ScanRange,
    constraint: &C,
) -> Result<OptimizationReport>
where
    C: Constraint + ?Sized,
{
    doc.validate("doc")?;
    woc.validate("woc")?;

    let wocs = woc.values();
    let pairs: Vec<(f64, f64)> = doc
        .values()
        .into_iter()
        .flat_map(|d| wocs.iter().map(move |&w| (d, w)))
        .collect();

    tracing::debug!(
        doc_samples = doc.samples,
        woc_samples = woc.samples,
        candidates = pairs.len(),
        "sweeping doc/woc grid"
    );

    let mut report = OptimizationReport {
        evaluated: pairs.len(),
        accepted: 0,
        best: None,
    };

    for candidate in evaluate_grid(base, &pairs) {
        let candidate = candidate?;
        if !constraint.accepts(&candidate) {
            continue;
        }
        report.accepted += 1;

        let better = report
            .best
            .map_or(true, |best| candidate.material_removal_rate > best.material_removal_rate);
        if better {
            report.best = Some(candidate);
        }
    }

    match &report.best {
        Some(best) => tracing::info!(
            evaluated = report.evaluated,
            accepted = report.accepted,
            doc = best.doc,
            woc = best.woc,
            mrr = best.material_removal_rate,
            "found best candidate"
        ),
        None => tracing::info!(
            evaluated = report.evaluated,
            "no candidate satisfies constraints"
        ),
    }

    Ok(report)
}

#[cfg(not(feature = "parallel"))]
fn evaluate_grid(
    base: &FeedsAndSpeedsCalculator,
    pairs: &[(f64, f64)],
) -> Vec<Result<FeedsAndSpeeds>> {
    pairs
        .iter()
        .map(|&(doc, woc)| base.with_doc_woc(doc, woc).calculate())
        .collect()
}

// Order is preserved by the indexed collect, so selection matches the
// sequential search.
#[cfg(feature = "parallel")]
fn evaluate_grid(
    base: &FeedsAndSpeedsCalculator,
    pairs: &[(f64, f64)],
) -> Vec<Result<FeedsAndSpeeds>> {
    use rayon::prelude::*;

    pairs
        .par_iter()
        .map(|&(doc, woc)| base.with_doc_woc(doc, woc).calculate())
        .collect()
}
