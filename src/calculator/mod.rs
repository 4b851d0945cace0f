//! Feeds and speeds calculator
//!
//! Derives cutting feedrate, material removal rate, spindle power and
//! torque, cutting force and tool deflection from:
//! - cutter geometry and material
//! - router (spindle) electrical rating and machine force limit
//! - target chip load, spindle speed, depth and width of cut
//!
//! All quantities are imperial (inches, in/min, in³/min, hp, lbf).
//! See [`crate::report`] for metric output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod calculations;
pub mod materials;
pub mod validators;

pub use calculations::*;
pub use materials::*;

/// Physical cutting tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cutter {
    pub material: CutterMaterial,
    pub diameter: f64,
    /// Flute length
    pub length: f64,
    pub flutes: u32,
    pub shank_diameter: f64,
    /// Unsupported length from the collet to the tip
    pub overall_stickout: f64,
    /// Deflection limit recommended for this tool
    pub maximum_deflection: f64,
}

/// Spindle motor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Router {
    pub input_voltage: f64,
    pub input_current: f64,
    /// Fraction of electrical input delivered to the spindle, `0 < e <= 1`
    pub efficiency: f64,
    pub rated_speed: f64,
}

impl Router {
    /// Electrical input (W)
    pub fn input_power(&self) -> f64 {
        self.input_voltage * self.input_current
    }

    /// Mechanical output (hp)
    pub fn output_power(&self) -> f64 {
        self.input_power() * self.efficiency / WATTS_PER_HORSEPOWER
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Maximum cutting force the machine frame tolerates (lbf)
    pub maximum_machine_force: f64,
    pub router: Router,
}

/// Per-cut parameters. The optimizer varies `doc` and `woc`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuttingParameters {
    pub chipload: f64,
    pub woc: f64,
    pub doc: f64,
    pub rpm: f64,
    pub k_factor: f64,
    pub max_acceptable_deflection: f64,
}

impl CuttingParameters {
    /// Copy of these parameters with a different depth and width of cut.
    pub fn with_doc_woc(self, doc: f64, woc: f64) -> Self {
        Self { doc, woc, ..self }
    }
}

/// Every derived quantity for one set of cutting parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedsAndSpeeds {
    pub doc: f64,
    pub woc: f64,
    pub rpm: f64,
    pub chipload: f64,
    pub adjusted_chipload: f64,
    pub feedrate: f64,
    pub material_removal_rate: f64,
    pub power_usage: f64,
    pub torque: f64,
    pub machine_force: f64,
    pub machine_force_percent: f64,
    pub available_power_percent: f64,
    pub router_cutting_power_increase: f64,
    pub max_deflection: f64,
    pub max_deflection_percent: f64,
}

/// Calculator errors
#[derive(Debug, Error)]
pub enum CalculatorError {
    #[error("invalid {field}: {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid {axis} scan range: {reason}")]
    InvalidRange { axis: &'static str, reason: String },

    #[error("calculation produced a non-finite {quantity}")]
    NonFinite { quantity: &'static str },

    #[error("unknown {kind}: {id}")]
    UnknownPreset { kind: &'static str, id: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CalculatorError>;

/// Machine, cutter and cutting parameters evaluated together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedsAndSpeedsCalculator {
    pub machine: Machine,
    pub cutter: Cutter,
    pub params: CuttingParameters,
}

impl FeedsAndSpeedsCalculator {
    pub fn new(machine: Machine, cutter: Cutter, params: CuttingParameters) -> Self {
        Self {
            machine,
            cutter,
            params,
        }
    }

    /// Independent copy of this calculator with a different depth and width of cut
    pub fn with_doc_woc(&self, doc: f64, woc: f64) -> Self {
        Self {
            machine: self.machine.clone(),
            cutter: self.cutter.clone(),
            params: self.params.with_doc_woc(doc, woc),
        }
    }

    /// Validate inputs and evaluate the whole formula chain once.
    pub fn calculate(&self) -> Result<FeedsAndSpeeds> {
        validators::validate_inputs(&self.machine, &self.cutter, &self.params)?;
        evaluate(&self.machine, &self.cutter, &self.params)
    }
}

/// Run the formula chain on inputs that already passed validation.
pub(crate) fn evaluate(
    machine: &Machine,
    cutter: &Cutter,
    params: &CuttingParameters,
) -> Result<FeedsAndSpeeds> {
    let adjusted_chipload = finite(
        "adjusted chip load",
        adjusted_chipload(cutter.diameter, params.woc, params.chipload),
    )?;
    let feedrate = finite(
        "feedrate",
        feedrate(cutter.flutes, params.rpm, adjusted_chipload),
    )?;
    let mrr = finite(
        "material removal rate",
        material_removal_rate(feedrate, params.doc, params.woc),
    )?;
    let power_usage = finite("power usage", power_usage(mrr, params.k_factor))?;
    let torque = finite("torque", torque(power_usage, params.rpm))?;
    let machine_force = finite("machine force", machine_force(torque, cutter.diameter))?;
    let max_deflection = finite(
        "deflection",
        max_deflection(cutter, machine_force, youngs_modulus(cutter.material)),
    )?;

    let result = FeedsAndSpeeds {
        doc: params.doc,
        woc: params.woc,
        rpm: params.rpm,
        chipload: params.chipload,
        adjusted_chipload,
        feedrate,
        material_removal_rate: mrr,
        power_usage,
        torque,
        machine_force,
        machine_force_percent: machine_force_percent(
            machine_force,
            machine.maximum_machine_force,
        ),
        available_power_percent: available_power_percent(
            power_usage,
            machine.router.output_power(),
        ),
        router_cutting_power_increase: router_cutting_power_increase(power_usage),
        max_deflection,
        max_deflection_percent: max_deflection_percent(
            max_deflection,
            params.max_acceptable_deflection,
        ),
    };

    tracing::trace!(
        doc = result.doc,
        woc = result.woc,
        feedrate = result.feedrate,
        mrr = result.material_removal_rate,
        "evaluated cutting parameters"
    );

    Ok(result)
}

fn finite(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalculatorError::NonFinite { quantity })
    }
}
