//! Email delivery seam.
//!
//! `EmailSender` is what the pipeline hands the finished email to. The
//! SendGrid client in `sdr-infra` implements it; `DryRunSender` here
//! stands in when nothing should leave the machine.

use std::future::Future;
use std::pin::Pin;

use sdr_types::email::{DeliveryReceipt, OutgoingEmail};
use sdr_types::error::EmailError;

/// Trait for email delivery providers.
pub trait EmailSender: Send + Sync {
    /// Provider name (e.g., "sendgrid").
    fn name(&self) -> &str;

    /// True when `send` does not actually deliver anything.
    fn is_dry_run(&self) -> bool {
        false
    }

    /// Deliver one email.
    fn send(
        &self,
        email: &OutgoingEmail,
    ) -> impl Future<Output = Result<DeliveryReceipt, EmailError>> + Send;
}

/// Object-safe version of [`EmailSender`] with a boxed future.
pub trait EmailSenderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn is_dry_run(&self) -> bool;

    fn send_boxed<'a>(
        &'a self,
        email: &'a OutgoingEmail,
    ) -> Pin<Box<dyn Future<Output = Result<DeliveryReceipt, EmailError>> + Send + 'a>>;
}

impl<T: EmailSender> EmailSenderDyn for T {
    fn name(&self) -> &str {
        EmailSender::name(self)
    }

    fn is_dry_run(&self) -> bool {
        EmailSender::is_dry_run(self)
    }

    fn send_boxed<'a>(
        &'a self,
        email: &'a OutgoingEmail,
    ) -> Pin<Box<dyn Future<Output = Result<DeliveryReceipt, EmailError>> + Send + 'a>> {
        Box::pin(self.send(email))
    }
}

/// Type-erased sender so the CLI can pick SendGrid or a dry run at runtime.
pub struct BoxEmailSender {
    inner: Box<dyn EmailSenderDyn>,
}

impl BoxEmailSender {
    pub fn new<T: EmailSender + 'static>(sender: T) -> Self {
        Self {
            inner: Box::new(sender),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn is_dry_run(&self) -> bool {
        self.inner.is_dry_run()
    }

    pub async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, EmailError> {
        self.inner.send_boxed(email).await
    }
}

/// Logs the email instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSender;

impl EmailSender for DryRunSender {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn is_dry_run(&self) -> bool {
        true
    }

    fn send(
        &self,
        email: &OutgoingEmail,
    ) -> impl Future<Output = Result<DeliveryReceipt, EmailError>> + Send {
        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            content_type = %email.content_type,
            body_len = email.body.len(),
            "Dry run: email not sent"
        );
        async {
            Ok(DeliveryReceipt {
                provider: "dry-run".to_string(),
                status_code: None,
                message_id: None,
                dry_run: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSender;
    use sdr_types::email::ContentType;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            from: "sales@complai.test".into(),
            to: "ceo@example.test".into(),
            subject: "Hello".into(),
            body: "<p>Hi</p>".into(),
            content_type: ContentType::Html,
        }
    }

    #[tokio::test]
    async fn dry_run_sender_reports_dry_run() {
        let sender = BoxEmailSender::new(DryRunSender);
        assert!(sender.is_dry_run());
        let receipt = sender.send(&email()).await.unwrap();
        assert!(receipt.dry_run);
        assert_eq!(receipt.provider, "dry-run");
        assert!(receipt.status_code.is_none());
    }

    #[tokio::test]
    async fn boxed_sender_delegates() {
        let inner = RecordingSender::default();
        let sent = inner.sent.clone();
        let sender = BoxEmailSender::new(inner);
        assert_eq!(sender.name(), "recording");
        assert!(!sender.is_dry_run());

        let receipt = sender.send(&email()).await.unwrap();
        assert_eq!(receipt.status_code, Some(202));
        assert_eq!(sent.lock().unwrap().len(), 1);
    }
}
