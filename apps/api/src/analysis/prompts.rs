// Prompt templates for résumé analysis.

pub const ANALYSIS_SYSTEM: &str = crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// Résumé text is truncated to this many characters before prompting.
pub const MAX_RESUME_CHARS: usize = 12_000;

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert career coach and recruiter. Analyze the following resume for a candidate targeting a {job_role} role.

RESUME TEXT:
{resume_text}

Provide a JSON response ONLY with this exact structure:
{
  "strengths": ["strength1", "strength2", "strength3"],
  "missingSkills": ["skill1", "skill2", "skill3"],
  "atsTips": ["tip1", "tip2", "tip3"],
  "improvements": ["improvement1", "improvement2", "improvement3"],
  "score": 7
}

"score" is a number from 0 to 10. Every list entry is a plain string.
IMPORTANT: Return ONLY valid JSON, no other text."#;

/// Fills the analysis template, truncating the résumé text on a char boundary.
pub fn build_analysis_prompt(resume_text: &str, job_role: &str) -> String {
    let truncated: String = resume_text.chars().take(MAX_RESUME_CHARS).collect();
    fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[("{job_role}", job_role), ("{resume_text}", truncated.as_str())],
    )
}

/// Substitutes placeholders in one left-to-right pass. Substituted values are
/// never rescanned, so user text that looks like a placeholder stays literal.
fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match vars.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
