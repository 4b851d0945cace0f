use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use swarf_feeds::calculator::validators::check_safety_margins;
use swarf_feeds::presets::{default_library, CutterSpec, Job, MachineSpec, PresetLibrary};
use swarf_feeds::{optimize, FeedsAndSpeeds, FeedsAndSpeedsCalculator, Result, UnitSystem};

#[derive(Parser, Debug)]
#[command(name = "swarf-feeds", version, about = "Feeds and speeds calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a single cut
    Calc(JobArgs),
    /// Search depth and width of cut for the highest removal rate
    Optimize(JobArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// JSON job file
    #[arg(long, value_name = "FILE")]
    job: Option<PathBuf>,

    /// Extra machine/cutter presets (JSON)
    #[arg(long, value_name = "FILE")]
    library: Option<PathBuf>,

    /// Machine preset id
    #[arg(long)]
    machine: Option<String>,

    /// Cutter preset id
    #[arg(long)]
    cutter: Option<String>,

    #[arg(long)]
    chipload: Option<f64>,

    #[arg(long)]
    rpm: Option<f64>,

    #[arg(long)]
    k_factor: Option<f64>,

    #[arg(long)]
    doc: Option<f64>,

    #[arg(long)]
    woc: Option<f64>,

    /// Print lengths in mm
    #[arg(long)]
    metric: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl JobArgs {
    /// Job file (or the Shapeoko/201 defaults) with command line overrides
    fn job(&self) -> Result<Job> {
        let mut job = match &self.job {
            Some(path) => Job::from_file(path)?,
            None => Job {
                machine: MachineSpec::Preset("shapeoko".to_string()),
                cutter: CutterSpec::Preset("201".to_string()),
                chipload: 0.002,
                rpm: 18000.0,
                k_factor: 10.0,
                doc: 0.075,
                woc: 0.1875,
                max_acceptable_deflection: None,
                doc_range: None,
                woc_range: None,
                constraints: None,
                units: UnitSystem::Imperial,
            },
        };

        if let Some(machine) = &self.machine {
            job.machine = MachineSpec::Preset(machine.clone());
        }
        if let Some(cutter) = &self.cutter {
            job.cutter = CutterSpec::Preset(cutter.clone());
        }
        job.chipload = self.chipload.unwrap_or(job.chipload);
        job.rpm = self.rpm.unwrap_or(job.rpm);
        job.k_factor = self.k_factor.unwrap_or(job.k_factor);
        job.doc = self.doc.unwrap_or(job.doc);
        job.woc = self.woc.unwrap_or(job.woc);
        if self.metric {
            job.units = UnitSystem::Metric;
        }

        Ok(job)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let args = match &cli.command {
        Command::Calc(args) | Command::Optimize(args) => args,
    };

    let mut library = default_library()?;
    if let Some(path) = &args.library {
        library.extend(PresetLibrary::from_file(path)?);
    }

    let job = args.job()?;
    let calc = job.calculator(&library)?;

    match &cli.command {
        Command::Calc(_) => {
            let result = calc.calculate()?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&in_units(result, job.units))?);
            } else {
                print_result(&result, &calc, job.units);
            }
        }
        Command::Optimize(_) => {
            let mut report = optimize(
                &calc,
                &job.doc_range(&calc.cutter),
                &job.woc_range(&calc.cutter),
                &job.constraints(),
            )?;

            if args.json {
                report.best = report.best.map(|best| in_units(best, job.units));
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!(
                "Evaluated {} candidates, {} within constraints",
                report.evaluated, report.accepted
            );
            match report.best {
                Some(best) => print_result(&best, &calc, job.units),
                None => println!("No candidate satisfies constraints"),
            }
        }
    }

    Ok(())
}

fn in_units(result: FeedsAndSpeeds, units: UnitSystem) -> FeedsAndSpeeds {
    match units {
        UnitSystem::Imperial => result,
        UnitSystem::Metric => result.to_metric(),
    }
}

fn print_result(result: &FeedsAndSpeeds, calc: &FeedsAndSpeedsCalculator, units: UnitSystem) {
    println!("{}", result.report(units));

    for issue in check_safety_margins(result, &calc.machine, &calc.cutter) {
        println!("  [{}] {}", issue.severity, issue.message);
        if let Some(suggestion) = issue.suggestion {
            println!("        {}", suggestion);
        }
    }
}
