//! Configuration validation.
//!
//! Every key is optional; these checks only reject values that are present
//! but unusable.

use crate::domain::error::SpreadError;
use crate::domain::family::parse_families;
use crate::domain::summary::Locale;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SpreadError> {
    validate_families(config)?;
    validate_max_lag(config)?;
    validate_locale(config)?;
    validate_paths(config)?;
    Ok(())
}

fn validate_families(config: &dyn ConfigPort) -> Result<(), SpreadError> {
    if let Some(list) = config.get_string("analysis", "families") {
        parse_families(&list).map_err(|e| SpreadError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "families".to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn validate_max_lag(config: &dyn ConfigPort) -> Result<(), SpreadError> {
    if let Some(value) = config.get_string("analysis", "max_lag") {
        if value.trim().parse::<usize>().is_err() {
            return Err(SpreadError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "max_lag".to_string(),
                reason: "max_lag must be a non-negative integer".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_locale(config: &dyn ConfigPort) -> Result<(), SpreadError> {
    if let Some(value) = config.get_string("report", "locale") {
        value
            .parse::<Locale>()
            .map_err(|reason| SpreadError::ConfigInvalid {
                section: "report".to_string(),
                key: "locale".to_string(),
                reason,
            })?;
    }
    Ok(())
}

fn validate_paths(config: &dyn ConfigPort) -> Result<(), SpreadError> {
    for (section, key) in [("data", "raw_dir"), ("data", "spread_dir"), ("report", "output")] {
        if let Some(value) = config.get_string(section, key) {
            if value.trim().is_empty() {
                return Err(SpreadError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: format!("{key} must not be empty"),
                });
            }
        }
    }
    Ok(())
}
