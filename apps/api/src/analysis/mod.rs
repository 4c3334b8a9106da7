// Résumé analysis: the Analysis record, its validator, and the LLM-backed analyzer.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod validation;
