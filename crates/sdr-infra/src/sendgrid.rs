//! SendGrid email delivery.
//!
//! Sends one email through the v3 Mail Send API. SendGrid answers `202
//! Accepted` with an `X-Message-Id` header; anything outside 2xx is a
//! rejection carrying the response body.

use std::future::Future;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use sdr_core::delivery::EmailSender;
use sdr_types::email::{DeliveryReceipt, OutgoingEmail};
use sdr_types::error::EmailError;

pub const SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";

const MESSAGE_ID_HEADER: &str = "x-message-id";

/// SendGrid v3 client.
///
/// The API key is only exposed when building the Authorization header.
pub struct SendGridSender {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl SendGridSender {
    pub fn new(api_key: SecretString) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EmailError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            base_url: SENDGRID_BASE_URL.to_string(),
        })
    }

    /// Point the client at another host (e.g., a local test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}/v3/mail/send", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

fn mail_send_body(email: &OutgoingEmail) -> MailSendRequest<'_> {
    MailSendRequest {
        personalizations: [Personalization {
            to: [Address { email: &email.to }],
        }],
        from: Address { email: &email.from },
        subject: &email.subject,
        content: [Content {
            content_type: email.content_type.as_mime(),
            value: &email.body,
        }],
    }
}

impl EmailSender for SendGridSender {
    fn name(&self) -> &str {
        "sendgrid"
    }

    fn send(
        &self,
        email: &OutgoingEmail,
    ) -> impl Future<Output = Result<DeliveryReceipt, EmailError>> + Send {
        let body = serde_json::to_value(mail_send_body(email));
        let missing = if email.from.trim().is_empty() {
            Some(EmailError::MissingSender)
        } else if email.to.trim().is_empty() {
            Some(EmailError::MissingRecipient)
        } else {
            None
        };
        let request = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret());

        async move {
            if let Some(err) = missing {
                return Err(err);
            }
            let body = body.map_err(|e| EmailError::Transport(e.to_string()))?;

            let response = request
                .json(&body)
                .send()
                .await
                .map_err(|e| EmailError::Transport(format!("HTTP request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EmailError::Rejected {
                    status: status.as_u16(),
                    body,
                });
            }

            let message_id = response
                .headers()
                .get(MESSAGE_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            tracing::debug!(status = status.as_u16(), ?message_id, "SendGrid accepted email");

            Ok(DeliveryReceipt {
                provider: "sendgrid".to_string(),
                status_code: Some(status.as_u16()),
                message_id,
                dry_run: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdr_types::email::ContentType;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            from: "sales@complai.test".into(),
            to: "ceo@example.test".into(),
            subject: "SOC2 without the pain".into(),
            body: "<p>Dear CEO</p>".into(),
            content_type: ContentType::Html,
        }
    }

    fn sender(base_url: &str) -> SendGridSender {
        SendGridSender::new(SecretString::from("SG.test-key".to_string()))
            .unwrap()
            .with_base_url(base_url)
    }

    /// Serve one HTTP request with a canned response; returns the raw request.
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn body_matches_mail_send_shape() {
        let value = serde_json::to_value(mail_send_body(&email())).unwrap();
        assert_eq!(value["personalizations"][0]["to"][0]["email"], "ceo@example.test");
        assert_eq!(value["from"]["email"], "sales@complai.test");
        assert_eq!(value["subject"], "SOC2 without the pain");
        assert_eq!(value["content"][0]["type"], "text/html");
        assert_eq!(value["content"][0]["value"], "<p>Dear CEO</p>");
    }

    #[test]
    fn plain_body_uses_text_plain() {
        let mut plain = email();
        plain.content_type = ContentType::Plain;
        let value = serde_json::to_value(mail_send_body(&plain)).unwrap();
        assert_eq!(value["content"][0]["type"], "text/plain");
    }

    #[tokio::test]
    async fn accepted_email_returns_message_id() {
        let (base, server) = serve_once(
            "HTTP/1.1 202 Accepted\r\nX-Message-Id: abc123\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let receipt = sender(&base).send(&email()).await.unwrap();
        assert_eq!(receipt.status_code, Some(202));
        assert_eq!(receipt.message_id.as_deref(), Some("abc123"));
        assert!(!receipt.dry_run);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v3/mail/send"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer sg.test-key"));
        assert!(request.contains("\"subject\":\"SOC2 without the pain\""));
    }

    #[tokio::test]
    async fn rejected_email_carries_status_and_body() {
        let (base, _server) = serve_once(
            "HTTP/1.1 401 Unauthorized\r\nContent-Length: 25\r\nConnection: close\r\n\r\n{\"errors\":[{\"msg\":\"no\"}]}",
        )
        .await;

        let err = sender(&base).send(&email()).await.unwrap_err();
        match err {
            EmailError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("errors"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_recipient_fails_without_request() {
        let mut unaddressed = email();
        unaddressed.to = String::new();
        // Nothing listens here; a request would fail with Transport.
        let err = sender("http://127.0.0.1:9").send(&unaddressed).await.unwrap_err();
        assert!(matches!(err, EmailError::MissingRecipient));
    }
}
