use std::path::PathBuf;

use anyhow::{bail, Result};
use log::{error, info};
use structopt::StructOpt;

use kbits_engine::ir::operator::Opcode;
use kbits_shared::config::{DEFAULT_SWEEP_WIDTH, MAX_WIDTH};
use kbits_shared::logging;
use kbits_testsuite::{collect_specs, sweep};

#[derive(StructOpt)]
#[structopt(
    name = "kbits-testsuite",
    about = "Sweep the known-bits verifier over widths, operators and flags",
    rename_all = "kebab-case"
)]
struct Args {
    /// Largest bit width of the sweep
    #[structopt(short, long)]
    max_width: Option<u32>,

    /// Restrict the sweep to these operators
    #[structopt(short, long, use_delimiter = true)]
    op: Vec<Opcode>,

    /// Verbosity, repeat for more
    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,

    /// Output the summary
    #[structopt(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::from_args();
    let Args {
        max_width,
        op,
        verbose,
        output,
    } = args;

    // setup logging
    logging::setup(verbose)?;

    let max_width = max_width.unwrap_or(DEFAULT_SWEEP_WIDTH);
    if max_width == 0 || max_width > MAX_WIDTH {
        bail!("maximum width must be within 1..={}", MAX_WIDTH);
    }

    let specs = collect_specs(&op);
    info!("sweeping {} operator(s) up to i{}", specs.len(), max_width);
    let summary = sweep(max_width, &specs)?;

    for report in &summary.reports {
        if !report.is_sound() {
            error!("{}", report);
            for case in &report.violations {
                error!("  unsound: {}", case);
            }
        }
    }
    info!("total cases: {}", summary.cases);
    info!("undefined: {}", summary.undefined);
    info!("imprecise: {}", summary.imprecise);
    info!("unsound: {}", summary.unsound);

    if let Some(path) = output {
        summary.save(&path)?;
    }

    if !summary.is_sound() {
        bail!("{} unsound case(s)", summary.unsound);
    }
    Ok(())
}
