use std::error::Error;

use cassia_solver::{Solver, Strength, Variable};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Upper bound on the frames a single `resize` run may produce.
const MAX_FRAMES: usize = 1_000_000;

#[derive(Parser)]
#[command(name = "cassia")]
#[command(about = "Incremental linear constraint solving from the command line", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the left/width/right chain for a suggested width
    Chain {
        /// Width suggested for the edit variable
        #[arg(short, long, default_value_t = 50.0)]
        width: f64,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resize a container holding a row of equal columns
    Resize {
        /// Number of columns
        #[arg(short, long)]
        columns: usize,
        /// First container width
        #[arg(long)]
        from: f64,
        /// Last container width
        #[arg(long)]
        to: f64,
        /// Width change between frames
        #[arg(long)]
        step: f64,
        /// Space between neighbouring columns
        #[arg(long, default_value_t = 0.0)]
        gap: f64,
        /// Smallest width a column may take
        #[arg(long, default_value_t = 0.0)]
        min_width: f64,
        /// Print the frames as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct ChainReport {
    strength: Strength,
    left: f64,
    width: f64,
    right: f64,
}

#[derive(Serialize)]
struct Frame {
    container: f64,
    changes: Vec<Change>,
}

#[derive(Serialize)]
struct Change {
    variable: Variable,
    name: String,
    value: f64,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Chain { width, json } => run_chain(width, json),
        Commands::Resize {
            columns,
            from,
            to,
            step,
            gap,
            min_width,
            json,
        } => run_resize(columns, from, to, step, gap, min_width, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("cassia=debug,cassia_solver=debug"),
        _ => EnvFilter::new("cassia=trace,cassia_solver=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_chain(suggested: f64, json: bool) -> Result<(), Box<dyn Error>> {
    let left = Variable::new();
    let width = Variable::new();
    let right = Variable::new();

    let mut solver = Solver::new();
    solver.name_variable(left, "left");
    solver.name_variable(width, "width");
    solver.name_variable(right, "right");

    solver.add_constraints([
        right.equal_to(left + width, Strength::REQUIRED),
        left.equal_to(0.0, Strength::REQUIRED),
        width.greater_or_equal(0.0, Strength::REQUIRED),
    ])?;
    solver.add_edit_variable(width, Strength::STRONG)?;
    solver.suggest_value(width, suggested)?;
    solver.fetch_changes();
    debug!(state = %solver.dump(), "solved chain");

    let report = ChainReport {
        strength: Strength::STRONG,
        left: solver.get_value(left),
        width: solver.get_value(width),
        right: solver.get_value(right),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("left  = {}", report.left);
        println!("width = {}", report.width);
        println!("right = {}", report.right);
    }
    Ok(())
}

/// Number of frames from `from` to `to` in steps of `step`, both ends included
/// when `to` falls on a step.
fn frame_count(from: f64, to: f64, step: f64) -> Result<usize, Box<dyn Error>> {
    if !(from.is_finite() && to.is_finite() && step.is_finite()) {
        return Err("--from, --to and --step must be finite numbers".into());
    }
    if step == 0.0 || (to - from) * step < 0.0 {
        return Err("--step must move from --from towards --to".into());
    }
    let steps = ((to - from) / step).floor();
    if !steps.is_finite() || steps >= MAX_FRAMES as f64 {
        return Err(format!("resizing would take more than {} frames", MAX_FRAMES).into());
    }
    Ok(steps as usize + 1)
}

fn run_resize(
    columns: usize,
    from: f64,
    to: f64,
    step: f64,
    gap: f64,
    min_width: f64,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    if columns == 0 {
        return Err("--columns must be at least 1".into());
    }
    if !(gap.is_finite() && min_width.is_finite()) {
        return Err("--gap and --min-width must be finite numbers".into());
    }
    let count = frame_count(from, to, step)?;

    let mut solver = Solver::new();
    let named = |solver: &mut Solver, name: String| {
        let variable = Variable::new();
        solver.name_variable(variable, name);
        variable
    };

    let container = named(&mut solver, "container".to_string());
    let lefts: Vec<Variable> = (0..columns)
        .map(|i| named(&mut solver, format!("left{}", i)))
        .collect();
    let widths: Vec<Variable> = (0..columns)
        .map(|i| named(&mut solver, format!("width{}", i)))
        .collect();

    solver.add_constraint(lefts[0].equal_to(0.0, Strength::REQUIRED))?;
    for i in 0..columns {
        solver.add_constraint(widths[i].greater_or_equal(min_width, Strength::REQUIRED))?;
        if i + 1 < columns {
            solver.add_constraint(
                lefts[i + 1].equal_to(lefts[i] + widths[i] + gap, Strength::REQUIRED),
            )?;
            solver.add_constraint(widths[i + 1].equal_to(widths[i], Strength::MEDIUM))?;
        }
    }
    let last = columns - 1;
    solver.add_constraint(container.equal_to(lefts[last] + widths[last], Strength::REQUIRED))?;
    solver.add_edit_variable(container, Strength::STRONG)?;
    info!(columns, constraints = solver.constraints().count(), "built layout");

    let mut frames = Vec::with_capacity(count);
    for frame in 0..count {
        let suggested = from + step * frame as f64;
        solver.suggest_value(container, suggested)?;
        let changes = solver
            .fetch_changes()
            .into_iter()
            .map(|(variable, value)| Change {
                variable,
                name: solver.variable_name(variable).unwrap_or_default().to_string(),
                value,
            })
            .collect();
        frames.push(Frame {
            container: solver.get_value(container),
            changes,
        });
    }
    debug!(state = %solver.dump(), "final layout");

    if json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
        return Ok(());
    }
    for frame in &frames {
        println!("container = {:.2}", frame.container);
        for change in &frame.changes {
            println!("  {:12} {:10.2}", change.name, change.value);
        }
    }
    Ok(())
}
