//! Input validation and safety checks

use super::*;

/// Reject inputs that would push the formula chain into NaN or infinity.
pub fn validate_inputs(
    machine: &Machine,
    cutter: &Cutter,
    params: &CuttingParameters,
) -> Result<()> {
    positive("diameter", cutter.diameter)?;
    positive("flute length", cutter.length)?;
    positive("shank diameter", cutter.shank_diameter)?;
    positive("overall stickout", cutter.overall_stickout)?;
    positive("maximum deflection", cutter.maximum_deflection)?;
    if cutter.flutes == 0 {
        return Err(CalculatorError::InvalidInput {
            field: "flutes",
            value: 0.0,
            reason: "cutter needs at least one flute",
        });
    }
    if cutter.length > cutter.overall_stickout {
        return Err(CalculatorError::InvalidInput {
            field: "flute length",
            value: cutter.length,
            reason: "longer than the overall stickout",
        });
    }

    positive("maximum machine force", machine.maximum_machine_force)?;
    positive("input voltage", machine.router.input_voltage)?;
    positive("input current", machine.router.input_current)?;
    positive("rated speed", machine.router.rated_speed)?;
    positive("efficiency", machine.router.efficiency)?;
    if machine.router.efficiency > 1.0 {
        return Err(CalculatorError::InvalidInput {
            field: "efficiency",
            value: machine.router.efficiency,
            reason: "must not exceed 1",
        });
    }

    positive("chipload", params.chipload)?;
    positive("doc", params.doc)?;
    positive("woc", params.woc)?;
    positive("rpm", params.rpm)?;
    positive("k_factor", params.k_factor)?;
    positive("max acceptable deflection", params.max_acceptable_deflection)?;
    if params.woc > cutter.diameter {
        return Err(CalculatorError::InvalidInput {
            field: "woc",
            value: params.woc,
            reason: "wider than the cutter diameter",
        });
    }

    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(CalculatorError::InvalidInput {
            field,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(CalculatorError::InvalidInput {
            field,
            value,
            reason: "must be positive",
        });
    }
    Ok(())
}

/// Validation issue with severity
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Check a calculated result against machine, router and tool limits
pub fn check_safety_margins(
    result: &FeedsAndSpeeds,
    machine: &Machine,
    cutter: &Cutter,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if result.machine_force_percent > 1.0 {
        issues.push(ValidationIssue {
            severity: Severity::Error,
            code: "MACHINE_FORCE_EXCEEDED".to_string(),
            message: format!(
                "Cutting force {:.2} lbf is {:.0}% of the machine limit {:.2} lbf",
                result.machine_force,
                result.machine_force_percent * 100.0,
                machine.maximum_machine_force
            ),
            suggestion: Some("Reduce DOC/WOC or chip load".to_string()),
        });
    }

    if result.available_power_percent > 1.0 {
        issues.push(ValidationIssue {
            severity: Severity::Error,
            code: "ROUTER_POWER_EXCEEDED".to_string(),
            message: format!(
                "Cut requires {:.3} hp, router delivers {:.3} hp",
                result.power_usage,
                machine.router.output_power()
            ),
            suggestion: Some("Take lighter passes".to_string()),
        });
    }

    if result.max_deflection_percent > 1.0 {
        issues.push(ValidationIssue {
            severity: Severity::Error,
            code: "TOOL_DEFLECTION".to_string(),
            message: format!(
                "Tool deflects {:.5}\", {:.0}% of the acceptable limit",
                result.max_deflection,
                result.max_deflection_percent * 100.0
            ),
            suggestion: Some("Reduce stickout or cutting force".to_string()),
        });
    }

    if result.rpm > machine.router.rated_speed {
        issues.push(ValidationIssue {
            severity: Severity::Warning,
            code: "RPM_ABOVE_RATED".to_string(),
            message: format!(
                "Spindle speed {:.0} RPM exceeds router rating {:.0} RPM",
                result.rpm, machine.router.rated_speed
            ),
            suggestion: None,
        });
    }

    if result.doc > cutter.length {
        issues.push(ValidationIssue {
            severity: Severity::Warning,
            code: "DOC_EXCEEDS_FLUTE_LENGTH".to_string(),
            message: format!(
                "DOC {:.4}\" is deeper than the {:.4}\" flute length",
                result.doc, cutter.length
            ),
            suggestion: Some("Use a longer cutter or step down".to_string()),
        });
    }

    for issue in issues.iter().filter(|i| i.severity == Severity::Error) {
        tracing::warn!(code = %issue.code, "{}", issue.message);
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> Machine {
        Machine {
            maximum_machine_force: 18.0,
            router: Router {
                input_voltage: 120.0,
                input_current: 6.5,
                efficiency: 0.6,
                rated_speed: 30000.0,
            },
        }
    }

    fn cutter() -> Cutter {
        Cutter {
            material: CutterMaterial::Carbide,
            diameter: 0.25,
            length: 0.75,
            flutes: 3,
            shank_diameter: 0.25,
            overall_stickout: 1.0,
            maximum_deflection: 0.001,
        }
    }

    fn params() -> CuttingParameters {
        CuttingParameters {
            chipload: 0.002,
            woc: 0.1875,
            doc: 0.075,
            rpm: 18000.0,
            k_factor: 10.0,
            max_acceptable_deflection: 0.001,
        }
    }

    fn rejected_field(m: &Machine, c: &Cutter, p: &CuttingParameters) -> &'static str {
        match validate_inputs(m, c, p) {
            Err(CalculatorError::InvalidInput { field, .. }) => field,
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_inputs_pass() {
        assert!(validate_inputs(&machine(), &cutter(), &params()).is_ok());
    }

    #[test]
    fn test_full_slot_is_valid() {
        let p = CuttingParameters {
            woc: 0.25,
            ..params()
        };
        assert!(validate_inputs(&machine(), &cutter(), &p).is_ok());
    }

    #[test]
    fn test_cutter_geometry_rejected() {
        let c = Cutter {
            diameter: 0.0,
            ..cutter()
        };
        assert_eq!(rejected_field(&machine(), &c, &params()), "diameter");

        let c = Cutter {
            shank_diameter: -0.25,
            ..cutter()
        };
        assert_eq!(rejected_field(&machine(), &c, &params()), "shank diameter");

        let c = Cutter {
            flutes: 0,
            ..cutter()
        };
        assert_eq!(rejected_field(&machine(), &c, &params()), "flutes");

        let c = Cutter {
            length: 1.5,
            ..cutter()
        };
        assert_eq!(rejected_field(&machine(), &c, &params()), "flute length");
    }

    #[test]
    fn test_router_rejected() {
        let mut m = machine();
        m.router.efficiency = 0.0;
        assert_eq!(rejected_field(&m, &cutter(), &params()), "efficiency");

        m.router.efficiency = 1.2;
        assert_eq!(rejected_field(&m, &cutter(), &params()), "efficiency");

        let mut m = machine();
        m.router.input_voltage = f64::NAN;
        assert_eq!(rejected_field(&m, &cutter(), &params()), "input voltage");
    }

    #[test]
    fn test_cutting_parameters_rejected() {
        let p = CuttingParameters {
            woc: 0.0,
            ..params()
        };
        assert_eq!(rejected_field(&machine(), &cutter(), &p), "woc");

        let p = CuttingParameters {
            woc: 0.26,
            ..params()
        };
        assert_eq!(rejected_field(&machine(), &cutter(), &p), "woc");

        let p = CuttingParameters {
            k_factor: 0.0,
            ..params()
        };
        assert_eq!(rejected_field(&machine(), &cutter(), &p), "k_factor");

        let p = CuttingParameters {
            rpm: f64::INFINITY,
            ..params()
        };
        assert_eq!(rejected_field(&machine(), &cutter(), &p), "rpm");
    }

    #[test]
    fn test_safety_margins_clean() {
        let result = FeedsAndSpeedsCalculator::new(machine(), cutter(), params())
            .calculate()
            .unwrap();
        let issues = check_safety_margins(&result, &machine(), &cutter());
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_safety_margins_overloaded() {
        let p = CuttingParameters {
            doc: 1.0,
            woc: 0.25,
            rpm: 36000.0,
            chipload: 0.01,
            ..params()
        };
        let result = FeedsAndSpeedsCalculator::new(machine(), cutter(), p)
            .calculate()
            .unwrap();
        let issues = check_safety_margins(&result, &machine(), &cutter());

        assert!(issues.iter().any(|i| i.code == "MACHINE_FORCE_EXCEEDED"));
        assert!(issues.iter().any(|i| i.code == "ROUTER_POWER_EXCEEDED"));
        assert!(issues.iter().any(|i| i.code == "TOOL_DEFLECTION"));
        assert!(issues.iter().any(|i| i.code == "RPM_ABOVE_RATED"));
        assert!(issues.iter().any(|i| i.code == "DOC_EXCEEDS_FLUTE_LENGTH"));
    }
}
