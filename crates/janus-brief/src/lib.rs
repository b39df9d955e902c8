//! Executive-briefing generation via an external language model.
//!
//! Reconciles the plan (the current sprint's issues) with the technical
//! reality (engineering activity inside the sprint window), assembles a
//! strategic-drift prompt, and asks an OpenAI-compatible chat endpoint for a
//! narrative briefing. Prompt assembly is pure and synchronous; only the
//! HTTP call is async.

pub mod llm;
pub mod prompt;

use chrono::{DateTime, Utc};
use janus_core::{LlmConfig, RawCommit, RawIssue, RawPullRequest, RawSprint, Result};

use crate::llm::{ChatMessage, LlmClient, Role};
use crate::prompt::{build_briefing_prompt, BRIEFING_SYSTEM_PROMPT};

/// Generate an executive briefing for the sprint covering `now`.
///
/// # Errors
///
/// Returns [`janus_core::JanusError::Llm`] on HTTP or response failures.
pub async fn generate_briefing(
    config: &LlmConfig,
    sprints: &[RawSprint],
    issues: &[RawIssue],
    commits: &[RawCommit],
    prs: &[RawPullRequest],
    now: DateTime<Utc>,
) -> Result<String> {
    let user_prompt = build_briefing_prompt(sprints, issues, commits, prs, now)?;
    let client = LlmClient::new(config)?;
    client
        .chat(vec![
            ChatMessage {
                role: Role::System,
                content: BRIEFING_SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: Role::User,
                content: user_prompt,
            },
        ])
        .await
}
