//! Comparison Engine: derives a structured diff between two validated analyses.
//!
//! Pure and deterministic: no I/O, no shared state. Both inputs must already
//! have passed `analysis::validation`; the engine does not re-check them.
//!
//! The section breakdown and ATS delta are heuristics over the only data an
//! analysis carries (four string lists and a score). Their constants are part
//! of the observable output and must stay as they are.

use std::collections::HashSet;

use crate::analysis::models::Analysis;
use crate::comparison::models::{
    ChangeItem, ChangeType, ComparisonResult, Impact, ProgressLevel, SectionBreakdown,
    SectionScore,
};

/// Multiplier applied to the score delta for the ATS heuristic.
pub const ATS_MULTIPLIER: f64 = 15.0;
const ATS_MIN: f64 = 0.0;
const ATS_MAX: f64 = 100.0;

/// A score change larger than this (in absolute points) is a high-impact change.
const HIGH_IMPACT_SCORE_DELTA: f64 = 1.0;

const EXPERIENCE_KEYWORDS: &[&str] = &["experience", "project"];
const EDUCATION_KEYWORDS: &[&str] = &["education", "degree"];

/// Compares an earlier analysis (`before`) against a later one (`after`).
///
/// Algorithm:
/// 1. score delta = after.score − before.score (signed, unrounded)
/// 2. skills = `strengths`, diffed by exact string equality in both directions
/// 3. ATS delta = clamp(delta × 15, 0, 100)
/// 4. section sub-scores from list lengths and keyword hits in `improvements`
/// 5. progress text from the delta thresholds in [`ProgressLevel::classify`]
/// 6. change list: score, added skills, removed skills, new ATS tips, in that order
pub fn compare(before: &Analysis, after: &Analysis) -> ComparisonResult {
    let score_improvement = after.score - before.score;
    let new_skills = difference(&after.strengths, &before.strengths);
    let removed_skills = difference(&before.strengths, &after.strengths);

    let changes = build_change_list(
        before,
        after,
        score_improvement,
        &new_skills,
        &removed_skills,
    );

    ComparisonResult {
        score_improvement,
        ats_improvement: ats_improvement(score_improvement),
        overall_progress: ProgressLevel::classify(score_improvement)
            .message()
            .to_string(),
        section_breakdown: analyze_sections(before, after),
        new_skills,
        removed_skills,
        changes,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sub-algorithms
// ────────────────────────────────────────────────────────────────────────────

/// Entries of `left` absent from `right`, in `left` order. Duplicates in
/// `left` are kept.
fn difference(left: &[String], right: &[String]) -> Vec<String> {
    let right: HashSet<&str> = right.iter().map(String::as_str).collect();
    left.iter()
        .filter(|item| !right.contains(item.as_str()))
        .cloned()
        .collect()
}

/// Linear proxy over the score delta only; `atsTips` content is not consulted.
fn ats_improvement(score_improvement: f64) -> f64 {
    (score_improvement * ATS_MULTIPLIER).clamp(ATS_MIN, ATS_MAX)
}

fn analyze_sections(before: &Analysis, after: &Analysis) -> SectionBreakdown {
    SectionBreakdown {
        skills: SectionScore {
            before: before.strengths.len(),
            after: after.strengths.len(),
        },
        experience: SectionScore {
            before: count_mentions(&before.improvements, EXPERIENCE_KEYWORDS),
            after: count_mentions(&after.improvements, EXPERIENCE_KEYWORDS),
        },
        education: SectionScore {
            before: count_mentions(&before.improvements, EDUCATION_KEYWORDS),
            after: count_mentions(&after.improvements, EDUCATION_KEYWORDS),
        },
    }
}

/// Number of entries containing any keyword, case-insensitively.
fn count_mentions(entries: &[String], keywords: &[&str]) -> usize {
    entries
        .iter()
        .filter(|entry| {
            let lower = entry.to_lowercase();
            keywords.iter().any(|kw| lower.contains(kw))
        })
        .count()
}

fn build_change_list(
    before: &Analysis,
    after: &Analysis,
    score_improvement: f64,
    new_skills: &[String],
    removed_skills: &[String],
) -> Vec<ChangeItem> {
    let mut changes = Vec::new();

    if score_improvement != 0.0 {
        let direction = if score_improvement > 0.0 {
            "increased"
        } else {
            "decreased"
        };
        let magnitude = score_improvement.abs();
        changes.push(ChangeItem {
            change_type: ChangeType::ScoreImprovement,
            description: format!(
                "Overall score {direction} by {} points",
                one_decimal(magnitude)
            ),
            impact: if magnitude > HIGH_IMPACT_SCORE_DELTA {
                Impact::High
            } else {
                Impact::Medium
            },
        });
    }

    changes.extend(new_skills.iter().map(|skill| ChangeItem {
        change_type: ChangeType::SkillAdded,
        description: format!("Added skill: {skill}"),
        impact: Impact::Medium,
    }));

    changes.extend(removed_skills.iter().map(|skill| ChangeItem {
        change_type: ChangeType::SkillRemoved,
        description: format!("Removed skill: {skill}"),
        impact: Impact::Low,
    }));

    changes.extend(
        difference(&after.ats_tips, &before.ats_tips)
            .into_iter()
            .map(|tip| ChangeItem {
                change_type: ChangeType::AtsImprovement,
                description: format!("ATS enhancement: {tip}"),
                impact: Impact::High,
            }),
    );

    changes
}

/// Formats a non-negative value with one decimal, rounding exact ties up.
///
/// `{:.1}` rounds ties to even. The only exactly representable ties at one
/// decimal are quarter points (x.25, x.75), so those are rounded explicitly.
fn one_decimal(value: f64) -> String {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        format!("{:.1}", (value * 10.0).round() / 10.0)
    } else {
        format!("{value:.1}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
