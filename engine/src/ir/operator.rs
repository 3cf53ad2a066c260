use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult, Misconfig};

/// Binary integer operators under verification
#[derive(Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    URem,
    SRem,
    Shl,
    LShr,
    AShr,
    And,
    Or,
    Xor,
}

impl Opcode {
    pub const ALL: [Opcode; 13] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::UDiv,
        Self::SDiv,
        Self::URem,
        Self::SRem,
        Self::Shl,
        Self::LShr,
        Self::AShr,
        Self::And,
        Self::Or,
        Self::Xor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::UDiv => "udiv",
            Self::SDiv => "sdiv",
            Self::URem => "urem",
            Self::SRem => "srem",
            Self::Shl => "shl",
            Self::LShr => "lshr",
            Self::AShr => "ashr",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
        }
    }

    /// Whether the opcode accepts the given poison-generating flag
    pub fn supports(self, flag: Flag) -> bool {
        match flag {
            Flag::Nsw | Flag::Nuw => matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Shl),
            Flag::Exact => matches!(self, Self::UDiv | Self::SDiv | Self::LShr | Self::AShr),
        }
    }
}

impl FromStr for Opcode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| Misconfig::UnknownOperator(s.to_string()).into())
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Poison-generating flags
#[derive(Serialize, Deserialize, Eq, PartialEq, Copy, Clone, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Nsw,
    Nuw,
    Exact,
}

impl Flag {
    pub const ALL: [Flag; 3] = [Self::Nsw, Self::Nuw, Self::Exact];

    pub fn name(self) -> &'static str {
        match self {
            Self::Nsw => "nsw",
            Self::Nuw => "nuw",
            Self::Exact => "exact",
        }
    }
}

impl FromStr for Flag {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.name() == s)
            .ok_or_else(|| Misconfig::UnknownFlag(s.to_string()).into())
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Set of flags attached to an operator
#[derive(Serialize, Deserialize, Eq, PartialEq, Hash, Copy, Clone, Debug, Default)]
pub struct Flags {
    pub nsw: bool,
    pub nuw: bool,
    pub exact: bool,
}

impl Flags {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has(&self, flag: Flag) -> bool {
        match flag {
            Flag::Nsw => self.nsw,
            Flag::Nuw => self.nuw,
            Flag::Exact => self.exact,
        }
    }

    pub fn with(mut self, flag: Flag) -> Self {
        match flag {
            Flag::Nsw => self.nsw = true,
            Flag::Nuw => self.nuw = true,
            Flag::Exact => self.exact = true,
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        Flag::ALL.into_iter().filter(|flag| self.has(*flag))
    }
}

/// An operator together with its flags
#[derive(Serialize, Deserialize, Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub struct OperatorSpec {
    pub opcode: Opcode,
    pub flags: Flags,
}

impl OperatorSpec {
    pub fn new(opcode: Opcode, flags: Flags) -> EngineResult<Self> {
        if let Some(flag) = flags.iter().find(|flag| !opcode.supports(*flag)) {
            return Err(Misconfig::FlagNotApplicable {
                flag: flag.to_string(),
                ops: opcode.to_string(),
            }
            .into());
        }
        Ok(Self { opcode, flags })
    }

    pub fn plain(opcode: Opcode) -> Self {
        Self {
            opcode,
            flags: Flags::none(),
        }
    }

    /// Every flag combination the opcode accepts, starting with no flags
    pub fn variants(opcode: Opcode) -> Vec<Self> {
        let applicable: Vec<_> = Flag::ALL
            .into_iter()
            .filter(|flag| opcode.supports(*flag))
            .collect();
        (0..1usize << applicable.len())
            .map(|bits| {
                let flags = applicable
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| bits & (1 << i) != 0)
                    .fold(Flags::none(), |acc, (_, flag)| acc.with(*flag));
                Self { opcode, flags }
            })
            .collect()
    }

    /// Resolve a command-line selection: no opcode means all of them, and
    /// each flag is attached to every selected opcode that accepts it
    pub fn select(opcodes: &[Opcode], flags: &[Flag]) -> EngineResult<Vec<Self>> {
        let mut selected: Vec<Opcode> = vec![];
        for opcode in opcodes {
            if !selected.contains(opcode) {
                selected.push(*opcode);
            }
        }
        if selected.is_empty() {
            selected.extend(Opcode::ALL);
        }

        for flag in flags {
            if !selected.iter().any(|op| op.supports(*flag)) {
                let ops: Vec<_> = selected.iter().map(|op| op.name()).collect();
                return Err(Misconfig::FlagNotApplicable {
                    flag: flag.to_string(),
                    ops: ops.join(","),
                }
                .into());
            }
        }

        let specs = selected
            .into_iter()
            .map(|opcode| {
                let flags = flags
                    .iter()
                    .filter(|flag| opcode.supports(**flag))
                    .fold(Flags::none(), |acc, flag| acc.with(*flag));
                Self { opcode, flags }
            })
            .collect();
        Ok(specs)
    }
}

impl Display for OperatorSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode)?;
        for flag in self.flags.iter() {
            write!(f, " {}", flag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        for op in Opcode::ALL {
            assert_eq!(op.name().parse::<Opcode>().unwrap(), op);
        }
        assert!(matches!(
            "rotl".parse::<Opcode>(),
            Err(EngineError::InvalidConfig(Misconfig::UnknownOperator(_)))
        ));
        assert_eq!("exact".parse::<Flag>().unwrap(), Flag::Exact);
        assert!("nsz".parse::<Flag>().is_err());
    }

    #[test]
    fn flags_are_checked_against_opcode() {
        let nsw = Flags::none().with(Flag::Nsw);
        assert!(OperatorSpec::new(Opcode::Add, nsw).is_ok());
        assert!(OperatorSpec::new(Opcode::UDiv, nsw).is_err());
        let exact = Flags::none().with(Flag::Exact);
        assert!(OperatorSpec::new(Opcode::AShr, exact).is_ok());
        assert!(OperatorSpec::new(Opcode::Shl, exact).is_err());
    }

    #[test]
    fn flag_variants() {
        assert_eq!(OperatorSpec::variants(Opcode::And).len(), 1);
        assert_eq!(OperatorSpec::variants(Opcode::LShr).len(), 2);
        let add = OperatorSpec::variants(Opcode::Add);
        assert_eq!(add.len(), 4);
        assert_eq!(add[0], OperatorSpec::plain(Opcode::Add));
        assert_eq!(add[3].to_string(), "add nsw nuw");
    }

    #[test]
    fn select_from_command_line() {
        let all = OperatorSpec::select(&[], &[]).unwrap();
        assert_eq!(all.len(), 13);

        let picked = OperatorSpec::select(&[Opcode::Add, Opcode::And, Opcode::Add], &[Flag::Nuw]).unwrap();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].to_string(), "add nuw");
        assert_eq!(picked[1].to_string(), "and");

        assert!(matches!(
            OperatorSpec::select(&[Opcode::Xor], &[Flag::Exact]),
            Err(EngineError::InvalidConfig(Misconfig::FlagNotApplicable { .. }))
        ));
    }
}
