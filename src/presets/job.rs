//! Job files: one machine, one cutter and the cut to evaluate or optimize

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{read_to_string, PresetLibrary};
use crate::calculator::{
    Cutter, CuttingParameters, FeedsAndSpeedsCalculator, Machine, Result,
};
use crate::optimizer::{Constraints, ScanRange};
use crate::report::UnitSystem;

/// Preset id or inline definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MachineSpec {
    Preset(String),
    Inline(Machine),
}

/// Preset id or inline definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CutterSpec {
    Preset(String),
    Inline(Cutter),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub machine: MachineSpec,
    pub cutter: CutterSpec,
    pub chipload: f64,
    pub rpm: f64,
    pub k_factor: f64,
    pub doc: f64,
    pub woc: f64,
    /// Defaults to the cutter's maximum deflection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_acceptable_deflection: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_range: Option<ScanRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub woc_range: Option<ScanRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    #[serde(default)]
    pub units: UnitSystem,
}

impl Job {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Resolve presets and build the calculator for this job
    pub fn calculator(&self, library: &PresetLibrary) -> Result<FeedsAndSpeedsCalculator> {
        let machine = match &self.machine {
            MachineSpec::Preset(id) => library.machine(id)?.clone(),
            MachineSpec::Inline(machine) => machine.clone(),
        };
        let cutter = match &self.cutter {
            CutterSpec::Preset(id) => library.cutter(id)?.clone(),
            CutterSpec::Inline(cutter) => cutter.clone(),
        };

        let params = CuttingParameters {
            chipload: self.chipload,
            woc: self.woc,
            doc: self.doc,
            rpm: self.rpm,
            k_factor: self.k_factor,
            max_acceptable_deflection: self
                .max_acceptable_deflection
                .unwrap_or(cutter.maximum_deflection),
        };

        Ok(FeedsAndSpeedsCalculator::new(machine, cutter, params))
    }

    pub fn doc_range(&self, cutter: &Cutter) -> ScanRange {
        self.doc_range.unwrap_or_else(|| ScanRange::doc_sweep(cutter))
    }

    pub fn woc_range(&self, cutter: &Cutter) -> ScanRange {
        self.woc_range.unwrap_or_else(|| ScanRange::woc_sweep(cutter))
    }

    pub fn constraints(&self) -> Constraints {
        self.constraints.unwrap_or_default()
    }
}
