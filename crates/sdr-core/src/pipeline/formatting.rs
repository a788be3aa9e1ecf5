//! Email formatting: subject writer and HTML converter.

use sdr_types::config::BodyFormat;
use sdr_types::email::{ContentType, FormattedEmail};

use crate::agent::prompts::{HTML_INSTRUCTIONS, SUBJECT_INSTRUCTIONS};
use crate::agent::runner::AgentRunner;
use crate::llm::box_provider::BoxLlmProvider;
use crate::usage::UsageLedger;

use super::PipelineError;

pub const SUBJECT_WRITER: &str = "subject_writer";
pub const HTML_CONVERTER: &str = "html_converter";

/// Subject used when the subject writer returns nothing usable.
pub const DEFAULT_SUBJECT: &str = "Sales email";

/// Turn the chosen draft into a subject + body ready to send.
pub async fn format_email(
    runner: &AgentRunner,
    provider: &BoxLlmProvider,
    model: &str,
    body: &str,
    format: BodyFormat,
    ledger: &mut UsageLedger,
) -> Result<FormattedEmail, PipelineError> {
    let subject = runner
        .complete_recorded(provider, SUBJECT_WRITER, model, SUBJECT_INSTRUCTIONS, body, ledger)
        .await
        .map_err(|source| PipelineError::Formatting {
            stage: SUBJECT_WRITER,
            source,
        })?;
    let subject = clean_subject(&subject.content);

    let email = match format {
        BodyFormat::Plain => FormattedEmail {
            subject,
            body: body.trim().to_string(),
            content_type: ContentType::Plain,
        },
        BodyFormat::Html => {
            let html = runner
                .complete_recorded(provider, HTML_CONVERTER, model, HTML_INSTRUCTIONS, body, ledger)
                .await
                .map_err(|source| PipelineError::Formatting {
                    stage: HTML_CONVERTER,
                    source,
                })?;
            let html = strip_code_fences(&html.content);
            if html.is_empty() {
                return Err(PipelineError::Formatting {
                    stage: HTML_CONVERTER,
                    source: sdr_types::llm::LlmError::Deserialization(
                        "empty HTML body".to_string(),
                    ),
                });
            }
            FormattedEmail {
                subject,
                body: html,
                content_type: ContentType::Html,
            }
        }
    };
    tracing::debug!(subject = %email.subject, content_type = %email.content_type, "Formatted email");
    Ok(email)
}

/// First non-empty line, without a `Subject:` label or surrounding quotes.
pub fn clean_subject(raw: &str) -> String {
    let line = strip_code_fences(raw)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string();
    let line = line.trim_start_matches(['*', '#']).trim();
    let line = strip_label(line, "subject:");
    let line = line
        .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '*' | '\u{201c}' | '\u{201d}'))
        .trim();
    if line.is_empty() {
        DEFAULT_SUBJECT.to_string()
    } else {
        line.to_string()
    }
}

/// Remove a leading markdown code fence (with optional language tag) and a
/// trailing closing fence.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

fn strip_label<'a>(line: &'a str, label: &str) -> &'a str {
    match line.get(..label.len()) {
        Some(head) if head.eq_ignore_ascii_case(label) => line[label.len()..].trim(),
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockProvider;

    #[test]
    fn subject_cleaning() {
        assert_eq!(clean_subject("Subject: \"Audit-ready in weeks\""), "Audit-ready in weeks");
        assert_eq!(clean_subject("\n\n  **Subject:** Quick SOC2 question\nMore text"), "Quick SOC2 question");
        assert_eq!(clean_subject("subject: 'Hi'"), "Hi");
        assert_eq!(clean_subject("Your SOC2, sorted"), "Your SOC2, sorted");
        assert_eq!(clean_subject("   \n  "), DEFAULT_SUBJECT);
        assert_eq!(clean_subject("Subject:"), DEFAULT_SUBJECT);
    }

    #[test]
    fn fence_stripping() {
        assert_eq!(strip_code_fences("```html\n<p>Hi</p>\n```"), "<p>Hi</p>");
        assert_eq!(strip_code_fences("```\n<p>Hi</p>```"), "<p>Hi</p>");
        assert_eq!(strip_code_fences("  <p>Hi</p>  "), "<p>Hi</p>");
    }

    #[tokio::test]
    async fn html_format_makes_two_calls() {
        let provider = BoxLlmProvider::new(MockProvider::new("openai", "gpt-4o-mini", |req| {
            if req.system.as_deref() == Some(SUBJECT_INSTRUCTIONS) {
                Ok("Subject: Save 80% on SOC2 prep".to_string())
            } else {
                Ok("```html\n<p>Dear CEO</p>\n```".to_string())
            }
        }));
        let mut ledger = UsageLedger::new();
        let email = format_email(
            &AgentRunner::default(),
            &provider,
            "gpt-4o-mini",
            "Dear CEO",
            BodyFormat::Html,
            &mut ledger,
        )
        .await
        .unwrap();

        assert_eq!(email.subject, "Save 80% on SOC2 prep");
        assert_eq!(email.body, "<p>Dear CEO</p>");
        assert_eq!(email.content_type, ContentType::Html);
        let roles: Vec<&str> = ledger.entries().iter().map(|e| e.role.as_str()).collect();
        assert_eq!(roles, vec![SUBJECT_WRITER, HTML_CONVERTER]);
    }

    #[tokio::test]
    async fn plain_format_keeps_body() {
        let provider = BoxLlmProvider::new(MockProvider::fixed("openai", "gpt-4o-mini", "Hello"));
        let mut ledger = UsageLedger::new();
        let email = format_email(
            &AgentRunner::default(),
            &provider,
            "",
            "  Dear CEO,\nbody  ",
            BodyFormat::Plain,
            &mut ledger,
        )
        .await
        .unwrap();

        assert_eq!(email.subject, "Hello");
        assert_eq!(email.body, "Dear CEO,\nbody");
        assert_eq!(email.content_type, ContentType::Plain);
        assert_eq!(ledger.entries().len(), 1);
    }

    #[tokio::test]
    async fn subject_failure_names_stage() {
        let provider = BoxLlmProvider::new(MockProvider::failing("openai", "gpt-4o-mini"));
        let mut ledger = UsageLedger::new();
        let err = format_email(
            &AgentRunner::default(),
            &provider,
            "",
            "body",
            BodyFormat::Html,
            &mut ledger,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::Formatting { stage: SUBJECT_WRITER, .. }));
    }
}
