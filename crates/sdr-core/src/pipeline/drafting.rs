//! Concurrent drafting: every sales agent writes one email for the brief.

use futures_util::future::join_all;
use tracing::{info, warn};

use sdr_types::agent::Draft;
use sdr_types::llm::LlmError;

use crate::agent::SalesAgent;
use crate::agent::prompts::{CompanyContext, persona_instructions};
use crate::agent::runner::{AgentRunner, record_response};
use crate::llm::registry::ProviderRegistry;
use crate::usage::UsageLedger;

/// Ask every agent in `roster` for a draft, all at once.
///
/// Failed calls and empty bodies are logged and left out. Drafts come back
/// in roster order.
pub async fn draft_all(
    runner: &AgentRunner,
    registry: &ProviderRegistry,
    roster: &[SalesAgent],
    ctx: &CompanyContext,
    brief: &str,
    ledger: &mut UsageLedger,
) -> Vec<Draft> {
    let calls = roster.iter().map(|agent| async move {
        let Some(provider) = registry.get(&agent.provider) else {
            return (agent, Err(LlmError::UnknownProvider(agent.provider.clone())));
        };
        let system = persona_instructions(&agent.persona, ctx);
        let result = runner
            .complete(provider, &agent.tool_name, &agent.model, &system, brief)
            .await;
        (agent, result)
    });
    let results = join_all(calls).await;

    let mut drafts = Vec::with_capacity(results.len());
    for (agent, result) in results {
        match result {
            Ok(response) => {
                if let Some(provider) = registry.get(&agent.provider) {
                    record_response(ledger, &agent.tool_name, provider, &agent.model, &response);
                }
                let body = response.content.trim();
                if body.is_empty() {
                    warn!(agent = %agent.tool_name, "Sales agent returned an empty draft");
                    continue;
                }
                drafts.push(Draft {
                    tool_name: agent.tool_name.clone(),
                    persona: agent.persona.name.clone(),
                    provider: agent.provider.clone(),
                    model: agent.model.clone(),
                    body: body.to_string(),
                });
            }
            Err(e) => {
                warn!(agent = %agent.tool_name, provider = %agent.provider, error = %e, "Sales agent failed");
            }
        }
    }
    info!(attempted = roster.len(), drafted = drafts.len(), "Drafting complete");
    drafts
}
