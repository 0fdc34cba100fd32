//! chemosched CLI - RCPSP-with-incompatibilities scheduling engine
//!
//! Command-line interface for parsing `.sm` instances, solving them with
//! branch-and-bound, and reporting the resulting cronograma.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chemosched_cli::report;
use chemosched_core::{ActivityId, Instance, Scheduler, SolveOptions, SolveReport};
use chemosched_parser::{parse_file, replicate_patients, with_resource_capacity};
use chemosched_solver::BranchAndBoundSolver;

const ACCEPTED_PATIENT_COUNTS: [usize; 4] = [5, 25, 40, 50];

#[derive(Parser)]
#[command(name = "chemosched")]
#[command(author, version, about = "RCPSP-with-incompatibilities solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance and print its schedule
    Solve(SolveArgs),

    /// Synthesize a multi-patient instance from a single-patient template
    Generate(GenerateArgs),
}

#[derive(Parser)]
struct SolveArgs {
    /// `.sm` instance file to solve
    #[arg(long, value_name = "FILE")]
    file: PathBuf,

    /// Number of patients in the instance, for the per-patient report
    #[arg(long)]
    patients: Option<usize>,

    /// Extra incompatible activity pair, as "i,j" (repeatable)
    #[arg(long = "incompatible", value_parser = parse_pair)]
    incompatibilities: Vec<(ActivityId, ActivityId)>,

    /// Wall-clock search budget, in seconds
    #[arg(long, default_value_t = 600)]
    time_limit: u64,

    /// Log search progress every 100 nodes
    #[arg(short, long)]
    verbose: bool,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: String,
}

#[derive(Parser)]
struct GenerateArgs {
    /// Single-patient `.sm` template file
    #[arg(long, value_name = "FILE")]
    template: PathBuf,

    /// Number of patient copies to replicate
    #[arg(long)]
    patients: usize,

    /// Override one resource's capacity ("R1") instead of replicating patients
    #[arg(long, requires = "capacity")]
    resource: Option<String>,

    /// Capacity to use with `--resource`
    #[arg(long)]
    capacity: Option<u32>,

    /// Output file for the generated instance (written as a JSON dump; see DESIGN.md)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

fn parse_pair(s: &str) -> Result<(ActivityId, ActivityId), String> {
    let (left, right) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"i,j\", found \"{s}\""))?;
    let i: ActivityId = left.trim().parse().map_err(|_| format!("not an integer: {left}"))?;
    let j: ActivityId = right.trim().parse().map_err(|_| format!("not an integer: {right}"))?;
    Ok((i, j))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Solve(args)) => cmd_solve(args),
        Some(Commands::Generate(args)) => cmd_generate(args),
        None => cmd_interactive(),
    }
}

/// No subcommand given: prompt for a patient count the way the original
/// script did, then solve the corresponding generated instance file.
fn cmd_interactive() -> Result<()> {
    println!("chemosched - RCPSP with incompatibilities (branch and bound)");
    println!("Accepted patient counts: 5, 25, 40, 50");
    print!("Number of patients: ");
    use std::io::Write as _;
    std::io::stdout().flush().ok();

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("failed to read patient count from stdin")?;
    let patients: usize = input
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid patient count: '{}'", input.trim()))?;

    if !ACCEPTED_PATIENT_COUNTS.contains(&patients) {
        anyhow::bail!(
            "invalid patient count {patients}; choose one of {:?}",
            ACCEPTED_PATIENT_COUNTS
        );
    }

    let file = PathBuf::from(format!("instances/folfiri_{patients}_patients.sm"));
    cmd_solve(SolveArgs {
        file,
        patients: Some(patients),
        incompatibilities: Vec::new(),
        time_limit: 600,
        verbose: true,
        format: "text".to_string(),
    })
}

fn cmd_solve(args: SolveArgs) -> Result<()> {
    let mut instance =
        parse_file(&args.file).with_context(|| format!("failed to parse '{}'", args.file.display()))?;

    if !args.incompatibilities.is_empty() {
        instance = rebuild_with_incompatibilities(&instance, &args.incompatibilities)?;
    }

    let options = SolveOptions {
        time_limit: Duration::from_secs(args.time_limit),
        verbose: args.verbose,
    };

    let solver = BranchAndBoundSolver::new();
    let report = solver.solve(&instance, options);

    match args.format.as_str() {
        "json" => println!("{}", format_json(&report)?),
        "text" => {
            print!("{}", format_text(&report));
            if let Some(ref schedule) = report.schedule {
                if let Some(patients) = args.patients {
                    println!("{}", report::format_per_patient(&instance, schedule, patients));
                }
            }
        }
        other => anyhow::bail!("unknown format '{other}'; supported formats: text, json"),
    }

    Ok(())
}

fn rebuild_with_incompatibilities(
    instance: &Instance,
    extra: &[(ActivityId, ActivityId)],
) -> Result<Instance> {
    let activities: Vec<_> = instance.activities().values().cloned().collect();
    let mut incompatibilities = instance.incompatibilities().to_vec();
    incompatibilities.extend_from_slice(extra);

    Instance::new(
        activities,
        instance.resources().clone(),
        instance.precedences().to_vec(),
        incompatibilities,
    )
    .context("failed to attach incompatibility pairs")
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let template = parse_file(&args.template)
        .with_context(|| format!("failed to parse template '{}'", args.template.display()))?;

    let generated = if let (Some(resource), Some(capacity)) = (&args.resource, args.capacity) {
        with_resource_capacity(&template, resource, capacity)
            .context("failed to build resource-capacity variant")?
    } else {
        replicate_patients(&template, args.patients).context("failed to replicate patients")?
    };

    let dump = serde_json::to_string_pretty(&DebugInstance::from(&generated))
        .context("failed to serialize generated instance")?;
    std::fs::write(&args.output, dump)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;

    println!(
        "Generated instance with {} activities written to '{}'",
        generated.activities().len(),
        args.output.display()
    );
    Ok(())
}

#[derive(serde::Serialize)]
struct DebugInstance {
    activities: Vec<chemosched_core::Activity>,
    resources: chemosched_core::Resources,
    precedences: Vec<(ActivityId, ActivityId)>,
    incompatibilities: Vec<(ActivityId, ActivityId)>,
}

impl From<&Instance> for DebugInstance {
    fn from(instance: &Instance) -> Self {
        Self {
            activities: instance.activities().values().cloned().collect(),
            resources: instance.resources().clone(),
            precedences: instance.precedences().to_vec(),
            incompatibilities: instance.incompatibilities().to_vec(),
        }
    }
}

fn format_text(report: &SolveReport) -> String {
    let mut out = String::new();
    out.push_str("================================================================\n");
    out.push_str("  BRANCH AND BOUND RESULTS\n");
    out.push_str("================================================================\n");
    match report.makespan {
        Some(makespan) => out.push_str(&format!("Optimal makespan: {makespan}\n")),
        None => out.push_str("No feasible schedule found\n"),
    }
    out.push_str(&format!("Nodes explored: {}\n", report.stats.nodes_explored));
    out.push_str(&format!("Nodes pruned: {}\n", report.stats.nodes_pruned));
    out.push_str(&format!("Elapsed: {:.2}s\n", report.stats.elapsed.as_secs_f64()));
    out.push_str(&format!(
        "Optimal: {}\n",
        if report.stats.optimal { "yes" } else { "no (time limit reached)" }
    ));
    out.push_str("================================================================\n");
    out
}

fn format_json(report: &SolveReport) -> Result<String> {
    let value = serde_json::json!({
        "makespan": report.makespan,
        "schedule": report.schedule,
        "stats": {
            "nodes_explored": report.stats.nodes_explored,
            "nodes_pruned": report.stats.nodes_pruned,
            "elapsed_secs": report.stats.elapsed.as_secs_f64(),
            "optimal": report.stats.optimal,
            "best_makespan": report.stats.best_makespan,
        },
    });
    serde_json::to_string_pretty(&value).context("failed to serialize report to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pair_accepts_comma_separated_ids() {
        assert_eq!(parse_pair("2,3").unwrap(), (2, 3));
    }

    #[test]
    fn parse_pair_rejects_missing_comma() {
        assert!(parse_pair("23").is_err());
    }

    #[test]
    fn parse_pair_rejects_non_integer() {
        assert!(parse_pair("a,b").is_err());
    }
}
