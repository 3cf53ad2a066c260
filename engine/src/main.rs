use std::path::PathBuf;

use anyhow::{bail, Result};
use log::{error, info};
use structopt::StructOpt;

use kbits_engine::analysis::enumerate::Algorithm;
use kbits_engine::flow::{save_reports, RunConfig, Shape};
use kbits_engine::ir::operator::{Flag, Opcode, OperatorSpec};
use kbits_shared::logging;

#[derive(StructOpt)]
#[structopt(
    name = "kbits-engine",
    about = "Exhaustive verification of known-bits transfer functions",
    rename_all = "kebab-case"
)]
struct Args {
    /// Bit width of the operands
    #[structopt(short, long)]
    width: u32,

    /// Operators to verify, all of them if omitted
    #[structopt(short, long, use_delimiter = true)]
    op: Vec<Opcode>,

    /// Flags attached to every selected operator that accepts them
    #[structopt(short, long, use_delimiter = true)]
    flags: Vec<Flag>,

    /// Lattice enumerator
    #[structopt(short, long, default_value = "fast")]
    enumerator: Algorithm,

    /// Cross-validate the enumerators before the run
    #[structopt(long)]
    self_check: bool,

    /// Verify `x op x` instead of independent operands
    #[structopt(short, long)]
    pseudo_unary: bool,

    /// Verbosity, repeat for more
    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,

    /// Write the reports as JSON
    #[structopt(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::from_args();
    let Args {
        width,
        op,
        flags,
        enumerator,
        self_check,
        pseudo_unary,
        verbose,
        output,
    } = args;

    // setup logging
    logging::setup(verbose)?;

    // resolve the configuration before touching any lattice
    let specs = OperatorSpec::select(&op, &flags)?;
    let config = RunConfig {
        width,
        algorithm: enumerator,
        self_check,
        shape: if pseudo_unary {
            Shape::PseudoUnary
        } else {
            Shape::Binary
        },
    };

    // run the verification
    let reports = kbits_engine::verify(config, &specs)?;
    let mut unsound = 0;
    for report in &reports {
        println!("{}", report);
        for case in &report.violations {
            for violation in &case.violations {
                println!("  unsound: {}: {}", case, violation);
            }
        }
        unsound += report.violations.len();
    }

    if let Some(path) = output {
        save_reports(&path, &reports)?;
        info!("reports saved to {}", path.display());
    }

    if unsound != 0 {
        error!("{} unsound case(s)", unsound);
        bail!("soundness violations found");
    }
    Ok(())
}
