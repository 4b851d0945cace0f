//! Feeds and speeds formulas
//!
//! Each function is one link of the chain
//! chip load -> feedrate -> MRR -> power -> torque -> force -> deflection.
//! Units are imperial: inches, minutes, horsepower, pounds-force, psi.

use std::cmp::Ordering;
use std::f64::consts::PI;

use super::*;

/// Watts per mechanical horsepower
pub const WATTS_PER_HORSEPOWER: f64 = 745.7;

/// hp -> in·lbf at a given rpm: 33000 · 12 / 2π
pub const TORQUE_CONSTANT: f64 = 63024.0;

/// Chip load corrected for radial chip thinning.
///
/// When the width of cut exceeds the cutter radius the tool is fully engaged
/// and the nominal chip load is returned unchanged. Otherwise the chip is
/// thinner than nominal and the chip load is scaled up by
/// [`thinned_chipload`].
pub fn adjusted_chipload(diameter: f64, woc: f64, chipload: f64) -> f64 {
    if woc > diameter / 2.0 {
        chipload
    } else {
        thinned_chipload(diameter, woc, chipload)
    }
}

/// Chip thinning compensation: `D·cl / (2·sqrt(D·woc - woc²))`.
///
/// Only finite for `0 < woc < diameter`.
pub fn thinned_chipload(diameter: f64, woc: f64, chipload: f64) -> f64 {
    (diameter * chipload) / (2.0 * (diameter * woc - woc.powi(2)).sqrt())
}

/// Feedrate (in/min) = flutes · rpm · chip load
pub fn feedrate(flutes: u32, rpm: f64, adjusted_chipload: f64) -> f64 {
    f64::from(flutes) * rpm * adjusted_chipload
}

/// Material removal rate (in³/min) = feedrate · doc · woc
pub fn material_removal_rate(feedrate: f64, doc: f64, woc: f64) -> f64 {
    feedrate * doc * woc
}

/// Spindle power demand (hp) = MRR / k-factor
pub fn power_usage(material_removal_rate: f64, k_factor: f64) -> f64 {
    material_removal_rate / k_factor
}

/// Spindle torque (in·lbf)
pub fn torque(power_usage: f64, rpm: f64) -> f64 {
    power_usage * TORQUE_CONSTANT / rpm
}

/// Tangential cutting force at the tool periphery (lbf)
pub fn machine_force(torque: f64, diameter: f64) -> f64 {
    torque / (diameter / 2.0)
}

pub fn machine_force_percent(machine_force: f64, maximum_machine_force: f64) -> f64 {
    machine_force / maximum_machine_force
}

pub fn available_power_percent(power_usage: f64, router_output_power: f64) -> f64 {
    power_usage / router_output_power
}

/// Extra electrical draw of the router while cutting (W)
pub fn router_cutting_power_increase(power_usage: f64) -> f64 {
    power_usage * WATTS_PER_HORSEPOWER
}

pub fn youngs_modulus(material: CutterMaterial) -> f64 {
    material.youngs_modulus()
}

/// Second moment of area of a round section, `π·(d/2)⁴/4`
pub fn second_moment_of_area(diameter: f64) -> f64 {
    PI * (diameter / 2.0).powi(4) / 4.0
}

/// Tip deflection (in) of the cutter modelled as a cantilevered beam.
///
/// - flute thinner than shank: two segments in series, the flute over its
///   length and the shank over the remaining stickout
/// - flute equal to shank: one uniform beam over the whole stickout
/// - flute thicker than shank: one beam over the whole stickout using the
///   shank section, with the second moment taken as `π·(d/2)⁴` (no `/4`).
///   This is 4x stiffer than the uniform case and is kept as found.
pub fn max_deflection(cutter: &Cutter, machine_force: f64, youngs_modulus: f64) -> f64 {
    let stickout = cutter.overall_stickout;

    match cutter.diameter.total_cmp(&cutter.shank_diameter) {
        Ordering::Less => {
            let flute_length = cutter.length;
            let shank_length = stickout - flute_length;
            let flute_inertia = second_moment_of_area(cutter.diameter);
            let shank_inertia = second_moment_of_area(cutter.shank_diameter);

            machine_force
                * (flute_length.powi(3) / (3.0 * youngs_modulus * flute_inertia)
                    + shank_length.powi(3) / (3.0 * youngs_modulus * shank_inertia))
        }
        Ordering::Equal => {
            let inertia = second_moment_of_area(cutter.diameter);
            machine_force * stickout.powi(3) / (3.0 * youngs_modulus * inertia)
        }
        Ordering::Greater => {
            let inertia = PI * (cutter.shank_diameter / 2.0).powi(4);
            machine_force * stickout.powi(3) / (3.0 * youngs_modulus * inertia)
        }
    }
}

pub fn max_deflection_percent(max_deflection: f64, max_acceptable_deflection: f64) -> f64 {
    max_deflection / max_acceptable_deflection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} ± {}, got {}",
            expected,
            tolerance,
            actual
        );
    }

    fn stepped_cutter() -> Cutter {
        Cutter {
            material: CutterMaterial::Carbide,
            diameter: 0.25,
            length: 0.75,
            flutes: 3,
            shank_diameter: 0.5,
            overall_stickout: 1.0,
            maximum_deflection: 0.001,
        }
    }

    #[test]
    fn test_full_engagement_keeps_chipload() {
        for &woc in &[0.126, 0.1875, 0.2, 0.25] {
            assert_eq!(adjusted_chipload(0.25, woc, 0.002), 0.002);
        }
    }

    #[test]
    fn test_partial_engagement_increases_chipload() {
        for &woc in &[0.001, 0.01, 0.05, 0.1, 0.124] {
            let adjusted = adjusted_chipload(0.25, woc, 0.002);
            assert!(adjusted >= 0.002, "woc {} gave {}", woc, adjusted);
        }
    }

    #[test]
    fn test_chipload_continuous_at_radius() {
        // At exactly half the diameter the thinning factor is 1
        assert_close(adjusted_chipload(0.25, 0.125, 0.002), 0.002, 1e-12);
    }

    #[test]
    fn test_thinning_not_finite_at_boundary() {
        assert!(!thinned_chipload(0.25, 0.0, 0.002).is_finite());
        assert!(!thinned_chipload(0.25, 0.25, 0.002).is_finite());
    }

    #[test]
    fn test_feed_calculation() {
        assert_close(feedrate(3, 10000.0, 0.002), 60.0, 1e-9);
    }

    #[test]
    fn test_reference_chain() {
        // 1/4" 3 flute carbide on a 1/2" shank, 0.1875" woc x 0.075" doc
        let cutter = stepped_cutter();
        let chipload = thinned_chipload(cutter.diameter, 0.1875, 0.002);
        assert_close(chipload, 0.00231, 0.00001);

        let feed = feedrate(cutter.flutes, 18000.0, chipload);
        assert_close(feed, 125.0, 0.5);

        let mrr = material_removal_rate(feed, 0.075, 0.1875);
        assert_close(mrr, 1.76, 0.01);

        let power = power_usage(mrr, 10.0);
        assert_close(power, 0.176, 0.001);

        let t = torque(power, 18000.0);
        assert_close(t, 0.617, 0.005);

        let force = machine_force(t, cutter.diameter);
        assert_close(force, 4.94, 0.04);

        assert_close(machine_force_percent(force, 18.0), 0.27, 0.005);
    }

    #[test]
    fn test_machine_force_scaling() {
        let base = machine_force(torque(0.2, 18000.0), 0.25);

        assert_close(machine_force(torque(0.4, 18000.0), 0.25), 2.0 * base, 1e-12);
        assert_close(machine_force(torque(0.2, 36000.0), 0.25), base / 2.0, 1e-12);
        assert_close(machine_force(torque(0.2, 18000.0), 0.5), base / 2.0, 1e-12);
    }

    #[test]
    fn test_router_power_round_trip() {
        let watts = router_cutting_power_increase(0.5);
        assert_close(watts, 372.85, 1e-9);
        assert_close(watts / WATTS_PER_HORSEPOWER, 0.5, 1e-12);
    }

    #[test]
    fn test_uniform_deflection() {
        let cutter = Cutter {
            shank_diameter: 0.25,
            ..stepped_cutter()
        };
        let inertia = PI * 0.125_f64.powi(4) / 4.0;
        let expected = 5.0 / (3.0 * 87_000_000.0 * inertia);

        assert_close(
            max_deflection(&cutter, 5.0, youngs_modulus(cutter.material)),
            expected,
            1e-15,
        );
    }

    #[test]
    fn test_stepped_deflection() {
        let cutter = stepped_cutter();
        let e = youngs_modulus(cutter.material);
        let expected = 5.0
            * (0.75_f64.powi(3) / (3.0 * e * second_moment_of_area(0.25))
                + 0.25_f64.powi(3) / (3.0 * e * second_moment_of_area(0.5)));

        assert_close(max_deflection(&cutter, 5.0, e), expected, 1e-15);
    }

    #[test]
    fn test_deflection_scales_with_force() {
        let cutter = stepped_cutter();
        let e = youngs_modulus(cutter.material);
        assert_close(
            max_deflection(&cutter, 10.0, e),
            2.0 * max_deflection(&cutter, 5.0, e),
            1e-15,
        );
    }

    #[test]
    fn test_stepped_branch_does_not_converge_to_uniform() {
        // As the shank shrinks toward the flute diameter the stepped model
        // tends to (L1³ + L2³)/S³ of the uniform model, not to it.
        let uniform = Cutter {
            shank_diameter: 0.25,
            ..stepped_cutter()
        };
        let nearly_uniform = Cutter {
            shank_diameter: 0.25 * (1.0 + 1e-9),
            ..stepped_cutter()
        };
        let e = youngs_modulus(uniform.material);

        let ratio =
            max_deflection(&nearly_uniform, 5.0, e) / max_deflection(&uniform, 5.0, e);
        let l1: f64 = 0.75;
        let l2: f64 = 0.25;
        assert_close(ratio, (l1.powi(3) + l2.powi(3)) / 1.0, 1e-6);
        assert!((ratio - 1.0).abs() > 0.1, "stepped branch now converges");
    }

    #[test]
    fn test_thick_flute_branch_is_quarter_of_uniform() {
        // The flute-thicker-than-shank branch drops the /4 in the second
        // moment, so it approaches a quarter of the uniform deflection.
        let uniform = Cutter {
            shank_diameter: 0.25,
            ..stepped_cutter()
        };
        let nearly_uniform = Cutter {
            shank_diameter: 0.25 * (1.0 - 1e-9),
            ..stepped_cutter()
        };
        let e = youngs_modulus(uniform.material);

        let ratio =
            max_deflection(&nearly_uniform, 5.0, e) / max_deflection(&uniform, 5.0, e);
        assert_close(ratio, 0.25, 1e-6);
    }

    #[test]
    fn test_deflection_percent() {
        assert_close(max_deflection_percent(0.0005, 0.001), 0.5, 1e-12);
    }
}
