use std::collections::HashMap;
use thiserror::Error;

use crate::config::{CatalogSettings, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if settings.engine.parameter_window == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "engine.parameter_window".to_string(),
                reason: "window must be greater than 0".to_string(),
            });
        }

        if let Err(e) = Self::validate_catalog(&settings.catalog) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_catalog(catalog: &CatalogSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if catalog.timeframes.is_empty() {
            errors.push(ValidationError::MissingField("catalog.timeframes".to_string()));
        }

        if catalog.chart_types.is_empty() {
            errors.push(ValidationError::MissingField("catalog.chart_types".to_string()));
        }

        let mut seen_names = HashMap::new();
        let mut seen_terms: HashMap<String, String> = HashMap::new();

        for (idx, spec) in catalog.indicators.iter().enumerate() {
            if spec.name.is_empty() {
                errors.push(ValidationError::MissingField(format!(
                    "catalog.indicators[{idx}].name"
                )));
                continue;
            }

            let key = spec.name.to_lowercase();
            if let Some(prev_idx) = seen_names.insert(key.clone(), idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Indicator '{}' appears at indices {} and {}",
                    spec.name, prev_idx, idx
                )));
            }

            // A synonym may not resolve to two different indicators
            for synonym in &spec.synonyms {
                let term = synonym.to_lowercase();
                if let Some(owner) = seen_terms.insert(term, spec.name.clone()) {
                    if owner != spec.name {
                        errors.push(ValidationError::Duplicate(format!(
                            "Synonym '{}' is claimed by both '{}' and '{}'",
                            synonym, owner, spec.name
                        )));
                    }
                }
            }

            for param in &spec.default_params {
                if *param == 0 || *param > 9999 {
                    errors.push(ValidationError::InvalidValue {
                        field: format!("catalog.indicators[{idx}].default_params"),
                        reason: format!("parameter {param} is out of range (1..=9999)"),
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
