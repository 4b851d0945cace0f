//! Cutter material data

use serde::{Deserialize, Serialize};

/// Young's modulus of tungsten carbide (psi)
pub const CARBIDE_YOUNGS_MODULUS: f64 = 87_000_000.0;

/// Young's modulus of high speed steel (psi)
pub const HSS_YOUNGS_MODULUS: f64 = 30_000_000.0;

/// Cutter material type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CutterMaterial {
    #[serde(rename = "carbide", alias = "CARBIDE")]
    #[default]
    Carbide,
    #[serde(rename = "hss", alias = "HSS", alias = "high_speed_steel")]
    HighSpeedSteel,
    #[serde(rename = "cobalt", alias = "COBALT")]
    Cobalt,
}

impl CutterMaterial {
    /// Young's modulus (psi) used by the deflection model.
    ///
    /// Cobalt shares the HSS constant.
    pub const fn youngs_modulus(self) -> f64 {
        match self {
            CutterMaterial::Carbide => CARBIDE_YOUNGS_MODULUS,
            CutterMaterial::HighSpeedSteel | CutterMaterial::Cobalt => HSS_YOUNGS_MODULUS,
        }
    }
}

impl std::fmt::Display for CutterMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CutterMaterial::Carbide => write!(f, "Carbide"),
            CutterMaterial::HighSpeedSteel => write!(f, "HSS"),
            CutterMaterial::Cobalt => write!(f, "Cobalt"),
        }
    }
}
