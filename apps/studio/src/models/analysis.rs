//! Shapes returned by the AI content service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImprovementSuggestions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
}

/// Résumé vs job description comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobAnalysis {
    pub match_score: u8, // 0 – 100
    pub keyword_gaps: Vec<String>,
    pub missing_skills: Vec<String>,
    pub improvement_suggestions: ImprovementSuggestions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AtsCheck {
    pub ats_score: u8, // 0 – 100
    pub suggestions: Vec<String>,
}
