use std::path::Path;

use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::domain::{calendar_date, Category, IssueId};
use crate::error::{AppError, CONFIG_INVALID, CONFIG_PARSE_FAILED, CONFIG_READ_FAILED};
use crate::generate::{default_distribution, CityCount, GeneratorOptions, DEFAULT_WINDOW_DAYS};

/// Upper bound on a configured corpus. The engine is sized for corpora in the low thousands.
pub const MAX_CORPUS_ISSUES: u64 = 100_000;

/// TOML-backed generation settings.
///
/// ```toml
/// seed = 42
/// anchor_date = "2026-03-31"
/// window_days = 30
/// first_id = 1
///
/// [[distribution]]
/// city = "Pune"
/// count = 100
/// ```
///
/// Every key is optional; omitted keys take the defaults below.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    pub seed: Option<u64>,
    /// `YYYY-MM-DD`; defaults to today (UTC) when absent.
    pub anchor_date: Option<String>,
    pub window_days: u32,
    pub first_id: IssueId,
    pub distribution: Vec<CityCount>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            anchor_date: None,
            window_days: DEFAULT_WINDOW_DAYS,
            first_id: 1,
            distribution: default_distribution(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        let config: EngineConfig = toml::from_str(text).map_err(|e| {
            AppError::new(CONFIG_PARSE_FAILED, "Failed to parse engine config")
                .with_details(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.window_days == 0 {
            return Err(AppError::new(CONFIG_INVALID, "window_days must be at least 1"));
        }
        if self.first_id < 0 {
            return Err(AppError::new(CONFIG_INVALID, "first_id must not be negative")
                .with_details(format!("first_id={}", self.first_id)));
        }
        if let Some(c) = self.distribution.iter().find(|c| c.city.trim().is_empty()) {
            return Err(AppError::new(CONFIG_INVALID, "distribution entry has an empty city")
                .with_details(format!("count={}", c.count)));
        }
        let total = self.corpus_size();
        if total > MAX_CORPUS_ISSUES {
            return Err(AppError::new(CONFIG_INVALID, "distribution asks for too many issues")
                .with_details(format!("total={total}; max={MAX_CORPUS_ISSUES}")));
        }
        self.parsed_anchor_date().map(|_| ())
    }

    /// Issues a uniform run of this distribution generates: every city count, for every category.
    pub fn corpus_size(&self) -> u64 {
        let per_category: u64 = self.distribution.iter().map(|c| u64::from(c.count)).sum();
        per_category * Category::ALL.len() as u64
    }

    fn parsed_anchor_date(&self) -> Result<Option<Date>, AppError> {
        self.anchor_date
            .as_deref()
            .map(|s| {
                calendar_date::parse(s).map_err(|e| {
                    AppError::new(CONFIG_INVALID, "anchor_date must be YYYY-MM-DD")
                        .with_details(format!("value={s}; err={e}"))
                })
            })
            .transpose()
    }

    pub fn generator_options(&self) -> Result<GeneratorOptions, AppError> {
        Ok(GeneratorOptions {
            seed: self.seed,
            anchor_date: self
                .parsed_anchor_date()?
                .unwrap_or_else(|| OffsetDateTime::now_utc().date()),
            window_days: self.window_days,
        })
    }
}

/// Read and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<EngineConfig, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::new(CONFIG_READ_FAILED, "Failed to read engine config")
            .with_details(format!("path={}; err={e}", path.display()))
    })?;
    EngineConfig::from_toml_str(&text).map_err(|e| {
        let details = match e.details.as_deref() {
            Some(d) => format!("path={}; {d}", path.display()),
            None => format!("path={}", path.display()),
        };
        e.with_details(details)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").expect("parse");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.distribution.len(), 3);
    }

    #[test]
    fn unknown_keys_and_bad_dates_are_rejected() {
        let err = EngineConfig::from_toml_str("sed = 1").unwrap_err();
        assert!(err.is(CONFIG_PARSE_FAILED));

        let err = EngineConfig::from_toml_str(r#"anchor_date = "31/03/2026""#).unwrap_err();
        assert!(err.is(CONFIG_INVALID));

        let err = EngineConfig::from_toml_str("window_days = 0").unwrap_err();
        assert!(err.is(CONFIG_INVALID));
    }

    #[test]
    fn oversized_distribution_is_rejected_before_generation() {
        let huge = "[[distribution]]\ncity = \"Pune\"\ncount = 4000000000\n";
        let err = EngineConfig::from_toml_str(huge).unwrap_err();
        assert!(err.is(CONFIG_INVALID));
        assert_eq!(
            err.details.as_deref(),
            Some("total=28000000000; max=100000")
        );

        // 7 categories x 14285 = 99995 fits; one more per category does not.
        let at_limit = "[[distribution]]\ncity = \"Pune\"\ncount = 14285\n";
        assert_eq!(
            EngineConfig::from_toml_str(at_limit).expect("parse").corpus_size(),
            99_995
        );
        let over = "[[distribution]]\ncity = \"Pune\"\ncount = 14286\n";
        assert!(EngineConfig::from_toml_str(over).unwrap_err().is(CONFIG_INVALID));

        assert_eq!(EngineConfig::default().corpus_size(), 7 * 125);
    }
}
