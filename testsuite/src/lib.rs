use std::fs;
use std::path::Path;

use anyhow::Result;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use kbits_engine::flow::{Driver, Report, RunConfig, Shape};
use kbits_engine::ir::operator::{Opcode, OperatorSpec};
use kbits_shared::config::PARALLEL;

/// Totals of a sweep over widths, operators, flags and operand shapes
#[derive(Serialize)]
pub struct Summary {
    pub max_width: u32,
    pub cases: u64,
    pub undefined: u64,
    pub imprecise: u64,
    pub unsound: usize,
    pub reports: Vec<Report>,
}

impl Summary {
    pub fn is_sound(&self) -> bool {
        self.unsound == 0
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Every flag combination of the given opcodes, all opcodes if none given
pub fn collect_specs(opcodes: &[Opcode]) -> Vec<OperatorSpec> {
    let opcodes = if opcodes.is_empty() {
        &Opcode::ALL[..]
    } else {
        opcodes
    };
    opcodes
        .iter()
        .flat_map(|opcode| OperatorSpec::variants(*opcode))
        .collect()
}

/// Verify every operator at widths `1..=max_width` in both operand shapes
pub fn sweep(max_width: u32, specs: &[OperatorSpec]) -> Result<Summary> {
    let mut reports = vec![];
    for width in 1..=max_width {
        for shape in [Shape::Binary, Shape::PseudoUnary] {
            let mut config = RunConfig::new(width);
            config.shape = shape;
            let driver = Driver::new(config)?;

            let batch: Vec<_> = if *PARALLEL {
                specs.par_iter().map(|spec| driver.run(spec)).collect()
            } else {
                specs.iter().map(|spec| driver.run(spec)).collect()
            };
            for report in &batch {
                debug!("{}", report);
            }
            info!("i{} {}: {} operator(s) done", width, shape, batch.len());
            reports.extend(batch);
        }
    }

    let summary = Summary {
        max_width,
        cases: reports.iter().map(|r| r.stats.cases).sum(),
        undefined: reports.iter().map(|r| r.stats.undefined).sum(),
        imprecise: reports.iter().map(|r| r.stats.imprecise).sum(),
        unsound: reports.iter().map(|r| r.violations.len()).sum(),
        reports,
    };
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_cover_flag_combinations() {
        // 4 flag sets for each of add/sub/mul/shl, 2 for each exact-capable
        // opcode, 1 for the remaining five
        assert_eq!(collect_specs(&[]).len(), 4 * 4 + 4 * 2 + 5);
        assert_eq!(collect_specs(&[Opcode::SDiv]).len(), 2);
    }

    #[test]
    fn sweep_counts_both_shapes() {
        let summary = sweep(2, &collect_specs(&[Opcode::And])).unwrap();
        assert!(summary.is_sound());
        assert_eq!(summary.reports.len(), 4);
        assert_eq!(summary.cases, (9 + 3) + (81 + 9));
        assert_eq!(summary.undefined, 0);
    }

    #[test]
    fn summary_is_written() {
        let summary = sweep(1, &collect_specs(&[Opcode::UDiv])).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        summary.save(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["max_width"], 1);
        assert_eq!(value["unsound"], 0);
        assert_eq!(value["reports"].as_array().unwrap().len(), 4);
    }
}
