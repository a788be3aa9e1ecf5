//! Sales agent domain types: personas, drafts and the manager's selection.

use serde::{Deserialize, Serialize};

/// A drafting style that a sales agent writes in.
///
/// `voice` goes before "sales agent" in the system prompt ("a humorous,
/// engaging sales agent"), `style` describes the emails it writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Display name (e.g., "Professional Sales Agent").
    pub name: String,
    /// Adjectives describing the agent, may be empty.
    #[serde(default)]
    pub voice: String,
    /// What the emails are like (e.g., "professional, serious cold emails").
    pub style: String,
}

impl Persona {
    pub fn new(name: &str, voice: &str, style: &str) -> Self {
        Self {
            name: name.to_string(),
            voice: voice.to_string(),
            style: style.to_string(),
        }
    }
}

/// The three personas every run drafts with unless configured otherwise.
pub fn default_personas() -> Vec<Persona> {
    vec![
        Persona::new(
            "Professional Sales Agent",
            "",
            "professional, serious cold emails",
        ),
        Persona::new(
            "Engaging Sales Agent",
            "humorous, engaging",
            "witty, engaging cold emails that are likely to get a response",
        ),
        Persona::new(
            "Busy Sales Agent",
            "busy",
            "concise, to-the-point cold emails",
        ),
    ]
}

/// One candidate email body produced by a sales agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    /// Tool name of the agent that wrote it (e.g., "sales_agent1_gpt-4o-mini").
    pub tool_name: String,
    pub persona: String,
    pub provider: String,
    pub model: String,
    pub body: String,
}

/// The manager's pick among the drafts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    /// Zero-based index into the draft list.
    pub index: usize,
    /// Manager's stated reason, when it gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// True when the manager's answer could not be parsed and the first draft was used.
    #[serde(default)]
    pub fallback: bool,
}
