use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use anyhow::Result;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use kbits_shared::config::{MAX_WIDTH, PARALLEL};
use kbits_shared::logging::Tracer;

use crate::analysis::bits::BitLattice;
use crate::analysis::enumerate::{self, Algorithm};
use crate::error::{EngineResult, Misconfig};
use crate::ir::operator::OperatorSpec;

use super::stats::AggregateStats;
use super::verify::{check_pair, check_self, CaseResult};

/// How the operands of a case relate to each other
#[derive(Serialize, Deserialize, Eq, PartialEq, Copy, Clone, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    /// `lhs op rhs` over every pair of lattices
    #[default]
    Binary,
    /// `x op x` over every lattice
    PseudoUnary,
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::PseudoUnary => write!(f, "pseudo-unary"),
        }
    }
}

/// Knobs of a verification run
#[derive(Serialize, Deserialize, Copy, Clone, Debug)]
pub struct RunConfig {
    pub width: u32,
    pub algorithm: Algorithm,
    pub self_check: bool,
    pub shape: Shape,
}

impl RunConfig {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            algorithm: Algorithm::default(),
            self_check: false,
            shape: Shape::default(),
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.width == 0 || self.width > MAX_WIDTH {
            return Err(Misconfig::WidthOutOfRange(self.width).into());
        }
        Ok(())
    }
}

/// Outcome of verifying one operator
#[derive(Serialize, Clone, Debug)]
pub struct Report {
    pub spec: OperatorSpec,
    pub width: u32,
    pub shape: Shape,
    pub stats: AggregateStats,
    pub violations: Vec<CaseResult>,
}

impl Report {
    pub fn is_sound(&self) -> bool {
        self.violations.is_empty()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self.shape {
            Shape::Binary => self.spec.to_string(),
            Shape::PseudoUnary => format!("{} (x, x)", self.spec),
        };
        let stats = &self.stats;
        write!(
            f,
            "{:<16} i{} cases = {}, undefined = {}, known bits = {}, oracle bits = {}, max = {}, known = {:.2}%, tightness = {:.2}%, imprecise = {}",
            name,
            self.width,
            stats.cases,
            stats.undefined,
            stats.known_bits,
            stats.oracle_bits,
            stats.max_bits,
            stats.percent_known(),
            stats.tightness(),
            stats.imprecise,
        )
    }
}

/// Dump reports as pretty-printed JSON
pub fn save_reports(path: &Path, reports: &[Report]) -> Result<()> {
    let content = serde_json::to_string_pretty(reports)?;
    fs::write(path, content)?;
    Ok(())
}

/// Partial result of a slice of the case space
#[derive(Default)]
struct Partial {
    stats: AggregateStats,
    violations: Vec<CaseResult>,
}

impl Partial {
    fn record(mut self, case: CaseResult) -> Self {
        debug!("{}", case);
        self.stats.record(&case);
        if !case.is_sound() {
            self.violations.push(case);
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.stats = self.stats.merge(other.stats);
        self.violations.extend(other.violations);
        self
    }
}

/// Runs operators over the lattice space of a width
pub struct Driver {
    config: RunConfig,
    lattices: Vec<BitLattice>,
}

impl Driver {
    /// Validate the configuration and enumerate the lattices once
    pub fn new(config: RunConfig) -> EngineResult<Self> {
        config.validate()?;
        if config.self_check {
            enumerate::self_check(config.width)?;
        }
        let lattices = enumerate::enumerate(config.algorithm, config.width)?;
        info!(
            "{} lattices of i{} via the {} enumerator",
            lattices.len(),
            config.width,
            config.algorithm
        );
        Ok(Self { config, lattices })
    }

    pub fn lattices(&self) -> &[BitLattice] {
        &self.lattices
    }

    /// Every case with the given lhs
    fn row(&self, spec: &OperatorSpec, lhs: &BitLattice) -> Partial {
        match self.config.shape {
            Shape::PseudoUnary => Partial::default().record(check_self(spec, lhs)),
            Shape::Binary => self
                .lattices
                .iter()
                .map(|rhs| check_pair(spec, lhs, rhs))
                .fold(Partial::default(), Partial::record),
        }
    }

    /// Verify one operator over the whole case space
    pub fn run(&self, spec: &OperatorSpec) -> Report {
        let tracer = Tracer::new(format!(
            "{} i{} {}",
            spec, self.config.width, self.config.shape
        ));

        let partial = if *PARALLEL {
            self.lattices
                .par_iter()
                .map(|lhs| self.row(spec, lhs))
                .reduce(Partial::default, Partial::merge)
        } else {
            self.lattices
                .iter()
                .map(|lhs| self.row(spec, lhs))
                .fold(Partial::default(), Partial::merge)
        };
        tracer.log(&format!(
            "{} cases, {} unsound",
            partial.stats.cases, partial.stats.unsound
        ));

        Report {
            spec: *spec,
            width: self.config.width,
            shape: self.config.shape,
            stats: partial.stats,
            violations: partial.violations,
        }
    }

    /// Verify each operator in turn
    pub fn run_all(&self, specs: &[OperatorSpec]) -> Vec<Report> {
        specs.iter().map(|spec| self.run(spec)).collect()
    }
}
