use serde::{Deserialize, Serialize};

/// Kind of a single entry in a comparison's change list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    ScoreImprovement,
    SkillAdded,
    SkillRemoved,
    AtsImprovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeItem {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub description: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScore {
    pub before: usize,
    pub after: usize,
}

/// Heuristic per-section sub-scores. See `engine::analyze_sections`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBreakdown {
    pub skills: SectionScore,
    pub experience: SectionScore,
    pub education: SectionScore,
}

/// Coarse classification of a score delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressLevel {
    Excellent,
    Good,
    Minor,
    Unchanged,
    Declined,
}

impl ProgressLevel {
    /// First matching threshold wins; all bounds are strict.
    pub fn classify(score_improvement: f64) -> Self {
        if score_improvement > 2.0 {
            ProgressLevel::Excellent
        } else if score_improvement > 0.5 {
            ProgressLevel::Good
        } else if score_improvement > 0.0 {
            ProgressLevel::Minor
        } else if score_improvement == 0.0 {
            ProgressLevel::Unchanged
        } else {
            ProgressLevel::Declined
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ProgressLevel::Excellent => "Excellent progress! Significant improvement detected.",
            ProgressLevel::Good => "Good progress! Steady improvement shown.",
            ProgressLevel::Minor => "Minor improvements detected.",
            ProgressLevel::Unchanged => "No significant changes detected.",
            ProgressLevel::Declined => "Score decreased. Consider reviewing changes.",
        }
    }
}

/// Structured diff between two analyses of the same résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub score_improvement: f64,
    pub new_skills: Vec<String>,
    pub removed_skills: Vec<String>,
    pub ats_improvement: f64,
    pub overall_progress: String,
    pub section_breakdown: SectionBreakdown,
    pub changes: Vec<ChangeItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_item_wire_format() {
        let item = ChangeItem {
            change_type: ChangeType::AtsImprovement,
            description: "ATS enhancement: Quantify achievements".to_string(),
            impact: Impact::High,
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({
                "type": "ats_improvement",
                "description": "ATS enhancement: Quantify achievements",
                "impact": "high"
            })
        );
    }

    #[test]
    fn test_progress_thresholds_are_strict() {
        assert_eq!(ProgressLevel::classify(2.01), ProgressLevel::Excellent);
        assert_eq!(ProgressLevel::classify(2.0), ProgressLevel::Good);
        assert_eq!(ProgressLevel::classify(0.51), ProgressLevel::Good);
        assert_eq!(ProgressLevel::classify(0.5), ProgressLevel::Minor);
        assert_eq!(ProgressLevel::classify(0.1), ProgressLevel::Minor);
        assert_eq!(ProgressLevel::classify(0.0), ProgressLevel::Unchanged);
        assert_eq!(ProgressLevel::classify(-0.1), ProgressLevel::Declined);
    }

    #[test]
    fn test_progress_messages() {
        assert_eq!(
            ProgressLevel::Unchanged.message(),
            "No significant changes detected."
        );
        assert_eq!(
            ProgressLevel::Declined.message(),
            "Score decreased. Consider reviewing changes."
        );
    }
}
