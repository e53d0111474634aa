use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use super::assessment::{BandTable, Questionnaire, ScoringEngine};
use super::classifier::{Classifier, ClassifierConfig, RuleSetError};

/// Data-only description of the triage behavior: keyword rules, band thresholds and
/// the questionnaire. Every section falls back to the standard data when omitted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriageProfile {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub bands: BandTable,
    #[serde(default = "Questionnaire::phq9_screener")]
    pub questionnaire: Questionnaire,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("unable to read triage profile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("triage profile {} is malformed: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid keyword rules: {0}")]
    Rules(#[from] RuleSetError),
}

/// Engines built from a profile, ready to be shared across requests.
#[derive(Debug, Clone)]
pub struct TriageEngines {
    pub classifier: Classifier,
    pub scoring: ScoringEngine,
    pub questionnaire: Arc<Questionnaire>,
}

impl TriageEngines {
    pub fn standard() -> Self {
        Self {
            classifier: Classifier::standard(),
            scoring: ScoringEngine::default(),
            questionnaire: Arc::new(Questionnaire::phq9_screener()),
        }
    }

    pub fn with_questionnaire(mut self, questionnaire: Questionnaire) -> Self {
        self.questionnaire = Arc::new(questionnaire);
        self
    }
}

impl TriageProfile {
    pub fn standard() -> Self {
        Self {
            classifier: ClassifierConfig::standard(),
            bands: BandTable::standard(),
            questionnaire: Questionnaire::phq9_screener(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn engines(&self) -> Result<TriageEngines, ProfileError> {
        let rules = self.classifier.build()?;
        Ok(TriageEngines {
            classifier: Classifier::new(rules),
            scoring: ScoringEngine::new(self.bands.clone()),
            questionnaire: Arc::new(self.questionnaire.clone()),
        })
    }
}

impl Default for TriageProfile {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::assessment::Band;
    use crate::triage::classifier::Category;

    #[test]
    fn empty_profile_uses_standard_sections() {
        let profile: TriageProfile = serde_json::from_str("{}").expect("empty profile");
        assert_eq!(profile, TriageProfile::standard());
    }

    #[test]
    fn partial_profile_overrides_only_its_sections() {
        let raw = r#"{
            "bands": [
                {"band": "minimal", "min_total": 0},
                {"band": "mild", "min_total": 2},
                {"band": "moderate", "min_total": 4},
                {"band": "severe", "min_total": 7}
            ]
        }"#;
        let profile: TriageProfile = serde_json::from_str(raw).expect("profile");
        let engines = profile.engines().expect("engines");

        assert_eq!(engines.scoring.bands().band_for(4), Band::Moderate);
        assert_eq!(engines.questionnaire.len(), 3);
        assert_eq!(
            engines.classifier.classify("exam week").category,
            Category::AcademicStress
        );
    }

    #[test]
    fn invalid_rules_surface_as_profile_errors() {
        let mut profile = TriageProfile::standard();
        profile.classifier.rules.clear();

        assert!(matches!(
            profile.engines(),
            Err(ProfileError::Rules(RuleSetError::MissingCrisisRule))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TriageProfile::from_path("/nonexistent/mindcare/profile.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mindcare/profile.json"));
    }
}
