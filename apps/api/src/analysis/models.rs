use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::validation::{validate, InvalidShape};

/// Structured feedback produced for one résumé version.
///
/// Deserialization goes through [`validate`], so an `Analysis` only exists
/// once its shape has been checked: four string lists and a score in `[0, 10]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct Analysis {
    pub strengths: Vec<String>,
    pub missing_skills: Vec<String>,
    pub ats_tips: Vec<String>,
    pub improvements: Vec<String>,
    pub score: f64,
}

impl TryFrom<Value> for Analysis {
    type Error = InvalidShape;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        validate(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let analysis = Analysis {
            strengths: vec!["Rust".to_string()],
            missing_skills: vec!["Kafka".to_string()],
            ats_tips: vec![],
            improvements: vec![],
            score: 6.5,
        };
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["missingSkills"], json!(["Kafka"]));
        assert_eq!(value["atsTips"], json!([]));
        assert_eq!(value["score"], json!(6.5));
    }

    #[test]
    fn test_deserialize_runs_validator() {
        let err = serde_json::from_value::<Analysis>(json!({
            "strengths": [],
            "missingSkills": [],
            "atsTips": [],
            "improvements": [],
            "score": "7"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("score"));
    }

    #[test]
    fn test_deserialize_from_llm_text() {
        let text = r#"{"strengths":["Python"],"missingSkills":["Go"],"atsTips":["Add keywords"],"improvements":["Add more project details"],"score":7}"#;
        let analysis: Analysis = serde_json::from_str(text).unwrap();
        assert_eq!(analysis.strengths, vec!["Python"]);
        assert_eq!(analysis.score, 7.0);
    }
}
