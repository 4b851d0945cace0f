//! Preset Library - JSON-based machine and cutter definitions
//!
//! Machines and cutters can be defined in a JSON file and referenced by id
//! from a [`Job`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::calculator::{CalculatorError, Cutter, Machine, Result};

pub mod job;

pub use job::*;

/// Named machines and cutters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetLibrary {
    #[serde(default)]
    pub machines: HashMap<String, Machine>,
    #[serde(default)]
    pub cutters: HashMap<String, Cutter>,
}

impl PresetLibrary {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load preset library from JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Add every preset of `other`, replacing entries with the same id
    pub fn extend(&mut self, other: PresetLibrary) {
        self.machines.extend(other.machines);
        self.cutters.extend(other.cutters);
    }

    pub fn machine(&self, id: &str) -> Result<&Machine> {
        self.machines
            .get(id)
            .ok_or_else(|| CalculatorError::UnknownPreset {
                kind: "machine",
                id: format!("{} (available: {})", id, sorted_ids(&self.machines)),
            })
    }

    pub fn cutter(&self, id: &str) -> Result<&Cutter> {
        self.cutters
            .get(id)
            .ok_or_else(|| CalculatorError::UnknownPreset {
                kind: "cutter",
                id: format!("{} (available: {})", id, sorted_ids(&self.cutters)),
            })
    }
}

fn sorted_ids<T>(map: &HashMap<String, T>) -> String {
    let mut ids: Vec<&str> = map.keys().map(String::as_str).collect();
    ids.sort_unstable();
    ids.join(", ")
}

pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CalculatorError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Built-in presets: the Shapeoko and the 201/205E quarter inch end mills
pub fn default_library() -> Result<PresetLibrary> {
    let json = r#"{
        "machines": {
            "shapeoko": {
                "maximum_machine_force": 18.0,
                "router": {
                    "input_voltage": 120.0,
                    "input_current": 6.5,
                    "efficiency": 0.6,
                    "rated_speed": 30000.0
                }
            }
        },
        "cutters": {
            "201": {
                "material": "carbide",
                "diameter": 0.25,
                "length": 0.75,
                "flutes": 3,
                "shank_diameter": 0.25,
                "overall_stickout": 1.0,
                "maximum_deflection": 0.001
            },
            "205e": {
                "material": "carbide",
                "diameter": 0.25,
                "length": 1.0,
                "flutes": 2,
                "shank_diameter": 0.25,
                "overall_stickout": 1.25,
                "maximum_deflection": 0.001
            }
        }
    }"#;

    PresetLibrary::from_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::CutterMaterial;

    #[test]
    fn test_default_library() {
        let lib = default_library().unwrap();

        let shapeoko = lib.machine("shapeoko").unwrap();
        assert_eq!(shapeoko.maximum_machine_force, 18.0);
        assert_eq!(shapeoko.router.input_power(), 780.0);

        let c201 = lib.cutter("201").unwrap();
        assert_eq!(c201.flutes, 3);
        assert_eq!(c201.material, CutterMaterial::Carbide);

        let c205e = lib.cutter("205e").unwrap();
        assert_eq!(c205e.flutes, 2);
        assert_eq!(c205e.overall_stickout, 1.25);
    }

    #[test]
    fn test_unknown_preset() {
        let lib = default_library().unwrap();
        let err = lib.cutter("999").unwrap_err();

        assert!(matches!(
            err,
            CalculatorError::UnknownPreset { kind: "cutter", .. }
        ));
        assert!(err.to_string().contains("201, 205e"));
    }

    #[test]
    fn test_extend_overrides() {
        let mut lib = default_library().unwrap();
        let custom = PresetLibrary::from_json(
            r#"{
                "cutters": {
                    "201": {
                        "material": "hss",
                        "diameter": 0.25,
                        "length": 0.5,
                        "flutes": 2,
                        "shank_diameter": 0.25,
                        "overall_stickout": 0.75,
                        "maximum_deflection": 0.002
                    }
                }
            }"#,
        )
        .unwrap();

        lib.extend(custom);

        assert_eq!(lib.cutter("201").unwrap().material, CutterMaterial::HighSpeedSteel);
        assert!(lib.cutter("205e").is_ok());
        assert!(lib.machine("shapeoko").is_ok());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            PresetLibrary::from_json("{ not json"),
            Err(CalculatorError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = PresetLibrary::from_file(Path::new("/nonexistent/presets.json")).unwrap_err();
        assert!(matches!(err, CalculatorError::Io { .. }));
    }
}
