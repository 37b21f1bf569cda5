//! Per-family result tagging for batch runs.
//!
//! A batch never aborts on a single family: each family yields either its
//! value or the error that stopped it.

use crate::domain::error::SpreadError;
use crate::domain::family::InstrumentFamily;

#[derive(Debug)]
pub enum FamilyOutcome<T> {
    Completed { family: InstrumentFamily, value: T },
    Failed {
        family: InstrumentFamily,
        error: SpreadError,
    },
}

impl<T> FamilyOutcome<T> {
    pub fn from_result(family: InstrumentFamily, result: Result<T, SpreadError>) -> Self {
        match result {
            Ok(value) => FamilyOutcome::Completed { family, value },
            Err(error) => FamilyOutcome::Failed { family, error },
        }
    }

    pub fn family(&self) -> &InstrumentFamily {
        match self {
            FamilyOutcome::Completed { family, .. } | FamilyOutcome::Failed { family, .. } => {
                family
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, FamilyOutcome::Completed { .. })
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            FamilyOutcome::Completed { value, .. } => Some(value),
            FamilyOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&SpreadError> {
        match self {
            FamilyOutcome::Completed { .. } => None,
            FamilyOutcome::Failed { error, .. } => Some(error),
        }
    }
}

pub fn count_completed<T>(outcomes: &[FamilyOutcome<T>]) -> usize {
    outcomes.iter().filter(|o| o.is_completed()).count()
}
