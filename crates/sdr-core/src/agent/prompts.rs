//! System prompts for every agent in the run.

use sdr_types::agent::{Draft, Persona};

pub const SUBJECT_INSTRUCTIONS: &str =
    "Write a concise, response-provoking subject for the given cold-email body. \
     Reply with the subject line only.";

pub const HTML_INSTRUCTIONS: &str =
    "Convert the plain-text cold-email body (may contain markdown) into a clean HTML email body. \
     Reply with the HTML only.";

/// Company context shared by the sales agents and the manager.
#[derive(Debug, Clone)]
pub struct CompanyContext {
    pub company: String,
    pub pitch: String,
}

/// System prompt for one sales persona.
pub fn persona_instructions(persona: &Persona, ctx: &CompanyContext) -> String {
    let voice = persona.voice.trim();
    let agent = if voice.is_empty() {
        "a sales agent".to_string()
    } else {
        format!("{} {voice} sales agent", article_for(voice))
    };
    format!(
        "You are {agent} working for {}, {}. You write {}.",
        ctx.company, ctx.pitch, persona.style
    )
}

/// System prompt for the manager choosing among drafts.
pub fn manager_instructions(ctx: &CompanyContext) -> String {
    format!(
        "You are a sales manager at {}. You never write emails yourself. \
         Review the candidate cold emails drafted by your sales agents and pick \
         the single best one, the one most likely to get a response.",
        ctx.company
    )
}

/// User message listing the drafts for the manager.
///
/// Drafts are numbered from 1 in the order given.
pub fn selection_request(drafts: &[Draft]) -> String {
    let mut out = String::from("Candidate drafts:\n\n");
    for (n, draft) in drafts.iter().enumerate() {
        out.push_str(&format!(
            "[{}] {} ({})\n{}\n\n",
            n + 1,
            draft.tool_name,
            draft.persona,
            draft.body.trim()
        ));
    }
    out.push_str(
        "Reply with JSON only, in the form {\"choice\": <draft number>, \"reason\": \"<one sentence>\"}.",
    );
    out
}

fn article_for(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}
