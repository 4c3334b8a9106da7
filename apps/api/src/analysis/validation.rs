//! Structural gate for analysis records.
//!
//! Analysis JSON is stored verbatim from the LLM, so nothing about its shape is
//! guaranteed on the way back out. Every read path goes through `validate` or
//! `try_validate` before the data is trusted. Malformed values are rejected,
//! never coerced: a score of `"7"` fails just like a missing score.

use serde_json::Value;
use thiserror::Error;

use crate::analysis::models::Analysis;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Why a value was rejected as an analysis record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidShape {
    #[error("analysis must be a JSON object")]
    NotAnObject,

    #[error("analysis is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("analysis field '{0}' must be an array of strings")]
    NotAnArray(&'static str),

    #[error("analysis field '{field}' has a non-string element at index {index}")]
    NonStringElement { field: &'static str, index: usize },

    #[error("analysis score must be a number")]
    ScoreNotNumeric,

    #[error("analysis score {0} is outside [0, 10]")]
    ScoreOutOfRange(f64),
}

/// Validates an untrusted value as an [`Analysis`].
///
/// Unknown extra fields are ignored; arrays may be empty.
pub fn validate(data: &Value) -> Result<Analysis, InvalidShape> {
    let object = data.as_object().ok_or(InvalidShape::NotAnObject)?;

    let strengths = string_list(object.get("strengths"), "strengths")?;
    let missing_skills = string_list(object.get("missingSkills"), "missingSkills")?;
    let ats_tips = string_list(object.get("atsTips"), "atsTips")?;
    let improvements = string_list(object.get("improvements"), "improvements")?;

    let score = match object.get("score") {
        None => return Err(InvalidShape::MissingField("score")),
        Some(value) => value.as_f64().ok_or(InvalidShape::ScoreNotNumeric)?,
    };
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(InvalidShape::ScoreOutOfRange(score));
    }

    Ok(Analysis {
        strengths,
        missing_skills,
        ats_tips,
        improvements,
        score,
    })
}

/// Non-failing form of [`validate`] for call sites that treat invalid or
/// legacy data as "not yet analyzed".
pub fn try_validate(data: &Value) -> Option<Analysis> {
    validate(data).ok()
}

fn string_list(value: Option<&Value>, field: &'static str) -> Result<Vec<String>, InvalidShape> {
    let items = value
        .ok_or(InvalidShape::MissingField(field))?
        .as_array()
        .ok_or(InvalidShape::NotAnArray(field))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str()
                .map(String::from)
                .ok_or(InvalidShape::NonStringElement { field, index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "strengths": [],
            "missingSkills": [],
            "atsTips": [],
            "improvements": [],
            "score": 0
        })
    }

    #[test]
    fn test_accepts_minimal_record() {
        let analysis = validate(&minimal()).unwrap();
        assert!(analysis.strengths.is_empty());
        assert_eq!(analysis.score, 0.0);
    }

    #[test]
    fn test_accepts_score_upper_bound_and_fraction() {
        let mut data = minimal();
        data["score"] = json!(10);
        assert_eq!(validate(&data).unwrap().score, 10.0);
        data["score"] = json!(7.5);
        assert_eq!(validate(&data).unwrap().score, 7.5);
    }

    #[test]
    fn test_preserves_list_contents_and_order() {
        let data = json!({
            "strengths": ["Python", "Leadership", "Python"],
            "missingSkills": ["Docker"],
            "atsTips": ["Add keywords"],
            "improvements": [" Add metrics "],
            "score": 5
        });
        let analysis = validate(&data).unwrap();
        assert_eq!(analysis.strengths, vec!["Python", "Leadership", "Python"]);
        assert_eq!(analysis.missing_skills, vec!["Docker"]);
        assert_eq!(analysis.ats_tips, vec!["Add keywords"]);
        assert_eq!(analysis.improvements, vec![" Add metrics "]);
    }

    #[test]
    fn test_ignores_unknown_fields() {
        let mut data = minimal();
        data["model"] = json!("x-ai/grok-4-fast:free");
        assert!(validate(&data).is_ok());
    }

    #[test]
    fn test_rejects_non_objects() {
        for data in [json!(null), json!("analysis"), json!(7), json!([]), json!(true)] {
            assert_eq!(validate(&data), Err(InvalidShape::NotAnObject));
        }
    }

    #[test]
    fn test_rejects_each_missing_field() {
        let fields: [&'static str; 5] =
            ["strengths", "missingSkills", "atsTips", "improvements", "score"];
        for field in fields {
            let mut data = minimal();
            data.as_object_mut().unwrap().remove(field);
            assert_eq!(validate(&data), Err(InvalidShape::MissingField(field)));
        }
    }

    #[test]
    fn test_rejects_string_score() {
        let mut data = minimal();
        data["score"] = json!("7");
        assert_eq!(validate(&data), Err(InvalidShape::ScoreNotNumeric));
    }

    #[test]
    fn test_rejects_null_score() {
        let mut data = minimal();
        data["score"] = Value::Null;
        assert_eq!(validate(&data), Err(InvalidShape::ScoreNotNumeric));
    }

    #[test]
    fn test_rejects_score_above_range() {
        let mut data = minimal();
        data["score"] = json!(11);
        assert_eq!(validate(&data), Err(InvalidShape::ScoreOutOfRange(11.0)));
    }

    #[test]
    fn test_rejects_negative_score() {
        let mut data = minimal();
        data["score"] = json!(-1);
        assert_eq!(validate(&data), Err(InvalidShape::ScoreOutOfRange(-1.0)));
    }

    #[test]
    fn test_rejects_non_string_element() {
        let mut data = minimal();
        data["atsTips"] = json!(["Add keywords", 3]);
        assert_eq!(
            validate(&data),
            Err(InvalidShape::NonStringElement {
                field: "atsTips",
                index: 1
            })
        );
    }

    #[test]
    fn test_rejects_non_array_list() {
        let mut data = minimal();
        data["improvements"] = json!("Add metrics");
        assert_eq!(validate(&data), Err(InvalidShape::NotAnArray("improvements")));
    }

    #[test]
    fn test_try_validate_returns_none_for_legacy_data() {
        assert!(try_validate(&json!({"summary": "old format"})).is_none());
        assert!(try_validate(&minimal()).is_some());
    }
}
