//! Instrument families and their contract legs.
//!
//! A family groups four contracts of one index future, ordered from the
//! nearest expiry (leg 0) to the farthest (leg 3). Spreads are taken between
//! every unordered pair of legs.

use std::collections::HashSet;
use std::fmt;

pub const LEG_COUNT: usize = 4;
pub const PAIR_COUNT: usize = LEG_COUNT * (LEG_COUNT - 1) / 2;
pub const DEFAULT_FAMILIES: [&str; 4] = ["if", "ih", "ic", "im"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstrumentFamily {
    symbol: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FamilyError {
    #[error("empty token in family list")]
    EmptyToken,

    #[error("invalid family symbol: {0}")]
    InvalidSymbol(String),

    #[error("duplicate family: {0}")]
    DuplicateFamily(String),
}

impl InstrumentFamily {
    pub fn new(symbol: &str) -> Result<Self, FamilyError> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Err(FamilyError::EmptyToken);
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(FamilyError::InvalidSymbol(trimmed.to_string()));
        }
        Ok(Self {
            symbol: trimmed.to_lowercase(),
        })
    }

    pub fn defaults() -> Vec<Self> {
        DEFAULT_FAMILIES
            .iter()
            .map(|s| Self {
                symbol: (*s).to_string(),
            })
            .collect()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Upper-case form used in file names and reports.
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// `close_<symbol><leg>`, e.g. `close_if2`.
    pub fn close_column(&self, leg: usize) -> String {
        format!("close_{}{}", self.symbol, leg)
    }

    /// Raw per-leg export, e.g. `IF00.csv` for leg 0.
    pub fn raw_file_name(&self, leg: usize) -> String {
        format!("{}0{}.csv", self.display_symbol(), leg)
    }

    pub fn spread_file_name(&self) -> String {
        format!("{}_spread.csv", self.symbol)
    }
}

impl fmt::Display for InstrumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_symbol())
    }
}

pub fn parse_families(input: &str) -> Result<Vec<InstrumentFamily>, FamilyError> {
    let mut families = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let family = InstrumentFamily::new(token)?;
        if !seen.insert(family.symbol.clone()) {
            return Err(FamilyError::DuplicateFamily(family.symbol));
        }
        families.push(family);
    }

    Ok(families)
}

/// An unordered pair of legs, stored with `near < far`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LegPair {
    pub near: usize,
    pub far: usize,
}

impl LegPair {
    pub fn new(a: usize, b: usize) -> Option<Self> {
        if a == b || a >= LEG_COUNT || b >= LEG_COUNT {
            return None;
        }
        Some(Self {
            near: a.min(b),
            far: a.max(b),
        })
    }

    /// All pairs in lexicographic order: 0-1, 0-2, 0-3, 1-2, 1-3, 2-3.
    pub fn all() -> [LegPair; PAIR_COUNT] {
        let mut pairs = [LegPair { near: 0, far: 1 }; PAIR_COUNT];
        let mut k = 0;
        for near in 0..LEG_COUNT {
            for far in (near + 1)..LEG_COUNT {
                pairs[k] = LegPair { near, far };
                k += 1;
            }
        }
        pairs
    }

    /// Position of this pair within [`LegPair::all`].
    pub fn index(&self) -> usize {
        // Pairs starting before `near` occupy sum_{r<near} (LEG_COUNT - 1 - r) slots.
        let before: usize = (0..self.near).map(|r| LEG_COUNT - 1 - r).sum();
        before + (self.far - self.near - 1)
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.near, self.far)
    }

    pub fn column_name(&self) -> String {
        format!("price_spread_{}_{}", self.near, self.far)
    }
}

impl fmt::Display for LegPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.near, self.far)
    }
}
