//! Unit conversion and printable feeds and speeds

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calculator::FeedsAndSpeeds;

pub const MM_PER_INCH: f64 = 25.4;

/// mm³ per in³
pub const MM3_PER_CUBIC_INCH: f64 = MM_PER_INCH * MM_PER_INCH * MM_PER_INCH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

impl FeedsAndSpeeds {
    /// Lengths in mm, feedrate in mm/min and MRR in mm³/min.
    ///
    /// Power, torque, force and the percentages keep their units.
    pub fn to_metric(&self) -> Self {
        self.scaled(MM_PER_INCH, MM3_PER_CUBIC_INCH)
    }

    /// Inverse of [`FeedsAndSpeeds::to_metric`]
    pub fn from_metric(&self) -> Self {
        self.scaled(1.0 / MM_PER_INCH, 1.0 / MM3_PER_CUBIC_INCH)
    }

    fn scaled(&self, length: f64, volume: f64) -> Self {
        Self {
            doc: self.doc * length,
            woc: self.woc * length,
            chipload: self.chipload * length,
            adjusted_chipload: self.adjusted_chipload * length,
            feedrate: self.feedrate * length,
            material_removal_rate: self.material_removal_rate * volume,
            max_deflection: self.max_deflection * length,
            ..*self
        }
    }

    /// Printable summary in the given units
    pub fn report(&self, units: UnitSystem) -> Report {
        let values = match units {
            UnitSystem::Imperial => *self,
            UnitSystem::Metric => self.to_metric(),
        };
        Report { values, units }
    }
}

/// Human readable feeds and speeds
#[derive(Debug, Clone, Copy)]
pub struct Report {
    values: FeedsAndSpeeds,
    units: UnitSystem,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.values;
        let (len, precision, name): (&str, usize, &str) = match self.units {
            UnitSystem::Imperial => ("in", 5, "imperial"),
            UnitSystem::Metric => ("mm", 3, "metric"),
        };

        writeln!(f, "Feeds and speeds ({})", name)?;
        writeln!(f, "  DOC:              {:.4} {}", r.doc, len)?;
        writeln!(f, "  WOC:              {:.4} {}", r.woc, len)?;
        writeln!(f, "  RPM:              {:.0}", r.rpm)?;
        writeln!(
            f,
            "  Chip load:        {:.p$} {} (adjusted {:.p$} {})",
            r.chipload,
            len,
            r.adjusted_chipload,
            len,
            p = precision
        )?;
        writeln!(f, "  Feedrate:         {:.1} {}/min", r.feedrate, len)?;
        writeln!(
            f,
            "  MRR:              {:.3} {}³/min",
            r.material_removal_rate, len
        )?;
        writeln!(
            f,
            "  Power usage:      {:.3} hp (+{:.0} W at the router, {:.1}% available)",
            r.power_usage,
            r.router_cutting_power_increase,
            r.available_power_percent * 100.0
        )?;
        writeln!(f, "  Torque:           {:.3} in·lbf", r.torque)?;
        writeln!(
            f,
            "  Machine force:    {:.2} lbf ({:.1}% of limit)",
            r.machine_force,
            r.machine_force_percent * 100.0
        )?;
        write!(
            f,
            "  Deflection:       {:.p$} {} ({:.1}% of acceptable)",
            r.max_deflection,
            len,
            r.max_deflection_percent * 100.0,
            p = precision + 1
        )
    }
}
