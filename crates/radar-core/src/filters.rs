//! Admin-controlled scoping of a collection run.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Geographic scope a run is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GeoScope {
    #[default]
    Global,
    India,
}

impl GeoScope {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GeoScope::Global => "GLOBAL",
            GeoScope::India => "INDIA",
        }
    }
}

impl std::fmt::Display for GeoScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; surrounding whitespace is ignored.
impl FromStr for GeoScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GLOBAL" => Ok(GeoScope::Global),
            "INDIA" => Ok(GeoScope::India),
            _ => Err(CoreError::InvalidGeoScope(s.to_string())),
        }
    }
}

/// The singleton filter record read at the start of every full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminFilter {
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub geo_scope: GeoScope,
    pub industries: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AdminFilter {
    /// Filter used when no record exists yet.
    #[must_use]
    pub fn with_defaults(keywords: &[String], geo_scope: GeoScope, industries: &[String]) -> Self {
        Self {
            include_keywords: clean_terms(keywords),
            exclude_keywords: Vec::new(),
            geo_scope,
            industries: clean_terms(industries),
            updated_at: None,
        }
    }

    /// Industry tag stamped on pains extracted under this filter.
    #[must_use]
    pub fn primary_industry(&self) -> &str {
        self.industries.first().map_or("SaaS", String::as_str)
    }
}

/// Replacement contents submitted by an administrator.
///
/// `geo_scope` arrives as free text and is only accepted once [`validate`]
/// succeeds, so an invalid scope never reaches storage.
///
/// [`validate`]: AdminFilterUpdate::validate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminFilterUpdate {
    #[serde(default)]
    pub include_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    #[serde(default = "default_geo_scope")]
    pub geo_scope: String,
    #[serde(default)]
    pub industries: Vec<String>,
}

fn default_geo_scope() -> String {
    GeoScope::Global.as_str().to_string()
}

impl AdminFilterUpdate {
    /// Validate the update and produce the filter it describes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidGeoScope`] if `geo_scope` is neither
    /// `GLOBAL` nor `INDIA` (case-insensitive).
    pub fn validate(&self) -> Result<AdminFilter, CoreError> {
        let geo_scope = self.geo_scope.parse::<GeoScope>()?;
        Ok(AdminFilter {
            include_keywords: clean_terms(&self.include_keywords),
            exclude_keywords: clean_terms(&self.exclude_keywords),
            geo_scope,
            industries: clean_terms(&self.industries),
            updated_at: None,
        })
    }
}

/// Trim each term and drop empties, preserving order.
fn clean_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_scope_parse_is_case_insensitive() {
        assert_eq!("india".parse::<GeoScope>(), Ok(GeoScope::India));
        assert_eq!(" Global ".parse::<GeoScope>(), Ok(GeoScope::Global));
    }

    #[test]
    fn geo_scope_rejects_unknown_value() {
        assert_eq!(
            "EUROPE".parse::<GeoScope>(),
            Err(CoreError::InvalidGeoScope("EUROPE".to_string()))
        );
    }

    #[test]
    fn update_with_invalid_geo_scope_fails_validation() {
        let update = AdminFilterUpdate {
            geo_scope: "mars".to_string(),
            ..AdminFilterUpdate::default()
        };
        assert!(matches!(
            update.validate(),
            Err(CoreError::InvalidGeoScope(ref v)) if v == "mars"
        ));
    }

    #[test]
    fn update_validation_cleans_terms() {
        let update = AdminFilterUpdate {
            include_keywords: vec!["  churn ".to_string(), String::new(), "costly".to_string()],
            exclude_keywords: vec!["   ".to_string()],
            geo_scope: "india".to_string(),
            industries: vec!["Fintech".to_string()],
        };
        let filter = update.validate().unwrap();
        assert_eq!(filter.include_keywords, vec!["churn", "costly"]);
        assert!(filter.exclude_keywords.is_empty());
        assert_eq!(filter.geo_scope, GeoScope::India);
        assert_eq!(filter.industries, vec!["Fintech"]);
    }

    #[test]
    fn update_defaults_to_global_when_geo_scope_omitted() {
        let update: AdminFilterUpdate =
            serde_json::from_str(r#"{"include_keywords":["churn"]}"#).unwrap();
        assert_eq!(update.validate().unwrap().geo_scope, GeoScope::Global);
    }

    #[test]
    fn primary_industry_falls_back_to_saas() {
        let filter = AdminFilter::with_defaults(&[], GeoScope::Global, &[]);
        assert_eq!(filter.primary_industry(), "SaaS");

        let filter = AdminFilter::with_defaults(&[], GeoScope::Global, &["AI".to_string()]);
        assert_eq!(filter.primary_industry(), "AI");
    }
}
