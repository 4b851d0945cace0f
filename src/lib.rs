//! Feeds and speeds for CNC routers.
//!
//! [`calculator`] derives feedrate, material removal rate, spindle load and
//! tool deflection for one cut; [`optimizer`] sweeps depth and width of cut
//! for the highest removal rate within safety limits.

pub mod calculator;
pub mod optimizer;
pub mod presets;
pub mod report;

pub use calculator::{
    CalculatorError, Cutter, CutterMaterial, CuttingParameters, FeedsAndSpeeds,
    FeedsAndSpeedsCalculator, Machine, Result, Router,
};
pub use optimizer::{optimize, Bounds, Constraint, Constraints, OptimizationReport, ScanRange};
pub use report::UnitSystem;
