//! The SDR run: draft, select, format, deliver.
//!
//! `SdrPipeline` owns everything a run needs (provider registry, roster,
//! manager binding, email sender) and executes the stages strictly in
//! sequence inside a single workflow span. Every LLM call lands in the
//! caller's `UsageLedger`, so usage can be logged even when a later stage
//! fails.

pub mod drafting;
pub mod formatting;
pub mod selection;

use serde::Serialize;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use sdr_types::agent::{Draft, Selection};
use sdr_types::config::SdrConfig;
use sdr_types::email::{DeliveryReceipt, FormattedEmail, OutgoingEmail};
use sdr_types::error::EmailError;
use sdr_types::llm::LlmError;

use crate::agent::prompts::{CompanyContext, manager_instructions, selection_request};
use crate::agent::runner::{AgentRunner, CallSettings};
use crate::agent::{SalesAgent, build_roster};
use crate::delivery::BoxEmailSender;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::registry::ProviderRegistry;
use crate::usage::UsageLedger;

/// Ledger role of the manager's selection call.
pub const MANAGER_ROLE: &str = "manager";

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no sales agents available (no drafting provider has an API key)")]
    NoAgents,

    #[error("all {attempted} sales agents failed to produce a draft")]
    NoDrafts { attempted: usize },

    #[error("manager provider '{0}' is not available")]
    ManagerUnavailable(String),

    #[error("manager selection failed: {0}")]
    Selection(#[source] LlmError),

    #[error("{stage} failed: {source}")]
    Formatting {
        stage: &'static str,
        #[source]
        source: LlmError,
    },

    #[error(transparent)]
    Delivery(#[from] EmailError),
}

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub drafts: Vec<Draft>,
    pub selection: Selection,
    pub email: FormattedEmail,
    pub receipt: DeliveryReceipt,
}

impl RunOutcome {
    pub fn chosen(&self) -> &Draft {
        &self.drafts[self.selection.index]
    }
}

pub struct SdrPipeline {
    config: SdrConfig,
    registry: ProviderRegistry,
    roster: Vec<SalesAgent>,
    sender: BoxEmailSender,
    runner: AgentRunner,
}

impl SdrPipeline {
    /// Bind a configuration to its providers and sender.
    ///
    /// Fails when no drafting provider is registered or the manager's
    /// provider is missing.
    pub fn new(
        config: &SdrConfig,
        registry: ProviderRegistry,
        sender: BoxEmailSender,
    ) -> Result<Self, PipelineError> {
        let roster = build_roster(&config.providers, &config.personas, &registry);
        if roster.is_empty() {
            return Err(PipelineError::NoAgents);
        }
        if !registry.contains(&config.manager.provider) {
            return Err(PipelineError::ManagerUnavailable(
                config.manager.provider.clone(),
            ));
        }
        let runner = AgentRunner::new(CallSettings {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        });
        Ok(Self {
            config: config.clone(),
            registry,
            roster,
            sender,
            runner,
        })
    }

    pub fn roster(&self) -> &[SalesAgent] {
        &self.roster
    }

    /// Execute one run for `brief`.
    pub async fn run(
        &self,
        brief: &str,
        ledger: &mut UsageLedger,
    ) -> Result<RunOutcome, PipelineError> {
        let run_id = Uuid::now_v7();
        let span = info_span!(
            "sdr.run",
            workflow = %self.config.workflow_name,
            run_id = %run_id,
            agents = self.roster.len(),
            sender = self.sender.name(),
        );
        self.run_inner(run_id, brief, ledger).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        brief: &str,
        ledger: &mut UsageLedger,
    ) -> Result<RunOutcome, PipelineError> {
        // Addresses are checked before any tokens are spent.
        let (from, to) = self.addresses()?;
        let brief = self.config.full_brief(brief);
        let ctx = CompanyContext {
            company: self.config.company.clone(),
            pitch: self.config.company_pitch.clone(),
        };

        let drafts = drafting::draft_all(
            &self.runner,
            &self.registry,
            &self.roster,
            &ctx,
            &brief,
            ledger,
        )
        .await;
        if drafts.is_empty() {
            return Err(PipelineError::NoDrafts {
                attempted: self.roster.len(),
            });
        }

        let manager = self.manager()?;
        let selection = self.select(manager, &ctx, &drafts, ledger).await?;
        let chosen = &drafts[selection.index];
        info!(
            chosen = %chosen.tool_name,
            fallback = selection.fallback,
            reason = selection.reason.as_deref().unwrap_or(""),
            "Draft selected"
        );

        let email = formatting::format_email(
            &self.runner,
            manager,
            &self.config.manager.model,
            &chosen.body,
            self.config.body_format,
            ledger,
        )
        .await?;

        let outgoing = OutgoingEmail::new(&from, &to, &email);
        let receipt = self.sender.send(&outgoing).await?;
        info!(
            provider = %receipt.provider,
            status = ?receipt.status_code,
            message_id = receipt.message_id.as_deref().unwrap_or(""),
            dry_run = receipt.dry_run,
            "Email handed off"
        );

        Ok(RunOutcome {
            run_id,
            drafts,
            selection,
            email,
            receipt,
        })
    }

    async fn select(
        &self,
        manager: &BoxLlmProvider,
        ctx: &CompanyContext,
        drafts: &[Draft],
        ledger: &mut UsageLedger,
    ) -> Result<Selection, PipelineError> {
        if drafts.len() == 1 {
            return Ok(Selection {
                index: 0,
                reason: None,
                fallback: false,
            });
        }
        let response = self
            .runner
            .complete_recorded(
                manager,
                MANAGER_ROLE,
                &self.config.manager.model,
                &manager_instructions(ctx),
                &selection_request(drafts),
                ledger,
            )
            .await
            .map_err(PipelineError::Selection)?;

        Ok(
            match selection::parse_selection(&response.content, drafts.len()) {
                Some(selection) => selection,
                None => {
                    warn!(
                        reply = %response.content,
                        "Could not read the manager's choice, using the first draft"
                    );
                    selection::fallback_selection()
                }
            },
        )
    }

    fn manager(&self) -> Result<&BoxLlmProvider, PipelineError> {
        self.registry
            .get(&self.config.manager.provider)
            .ok_or_else(|| PipelineError::ManagerUnavailable(self.config.manager.provider.clone()))
    }

    fn addresses(&self) -> Result<(String, String), EmailError> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let from = non_blank(&self.config.from_email);
        let to = non_blank(&self.config.to_email);
        if self.sender.is_dry_run() {
            return Ok((from.unwrap_or_default(), to.unwrap_or_default()));
        }
        let from = from.ok_or(EmailError::MissingSender)?;
        let to = to.ok_or(EmailError::MissingRecipient)?;
        Ok((from, to))
    }
}
