// src/services/sms.rs
//
// SMS gateway seam, message templates and tracking-token recovery. The
// lifecycle engine never talks HTTP directly; it renders messages, queues
// them, and hands dispatch to an `SmsProvider`.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;

/// Outbound SMS gateway. Implementations return the raw provider response
/// body on success so it can be captured on the outbox row.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn send(&self, recipient: &str, message: &str) -> Result<String, anyhow::Error>;
}

/// Fixed pause before the single internal retry.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Per-request cap on a gateway call. Keeps the synchronous dispatch window
/// bounded, which the reminder flow's outbox hold relies on.
pub const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// One dispatch attempt plus one internal retry after a fixed short delay.
/// Returns the provider response, or the last error once both attempts fail.
pub async fn dispatch_with_retry(
    provider: &dyn SmsProvider,
    recipient: &str,
    message: &str,
) -> Result<String, anyhow::Error> {
    match provider.send(recipient, message).await {
        Ok(response) => Ok(response),
        Err(first_err) => {
            tracing::warn!("SMS dispatch failed, retrying once: {first_err}");
            tokio::time::sleep(RETRY_DELAY).await;
            provider.send(recipient, message).await
        }
    }
}

// =============================================================================
//  HTTP GATEWAY CLIENT
// =============================================================================

/// Thin client for a JSON SMS gateway (`POST {api_url}` with an API key
/// header). The gateway contract is deliberately minimal.
pub struct HttpSmsProvider {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    sender_id: String,
}

impl HttpSmsProvider {
    pub fn new(api_url: String, api_key: String, sender_id: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(GATEWAY_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_url,
            api_key,
            sender_id,
        })
    }
}

#[async_trait]
impl SmsProvider for HttpSmsProvider {
    async fn send(&self, recipient: &str, message: &str) -> Result<String, anyhow::Error> {
        let response = self
            .http
            .post(&self.api_url)
            .header("X-Api-Key", &self.api_key)
            .json(&serde_json::json!({
                "senderId": self.sender_id,
                "to": recipient,
                "message": message,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            Ok(body)
        } else {
            Err(anyhow::anyhow!("gateway returned {status}: {body}"))
        }
    }
}

// =============================================================================
//  MESSAGE TEMPLATES
// =============================================================================

pub fn tracking_url(base_url: &str, raw_token: &str) -> String {
    format!("{}/track/{}", base_url.trim_end_matches('/'), raw_token)
}

/// Intake confirmation. The one and only place the raw tracking token leaves
/// the system, so the text keeps both an explicit marker and the URL form
/// that `extract_tracking_token` knows how to find again.
pub fn repair_created_message(
    client_name: &str,
    bill_no: &str,
    estimated_delivery_date: NaiveDate,
    base_url: &str,
    raw_token: &str,
) -> String {
    format!(
        "Hello {client_name}, we have received your bat for repair (bill {bill_no}). \
         Estimated delivery: {estimated_delivery_date}. \
         Track progress: {}. Tracking token: {raw_token}",
        tracking_url(base_url, raw_token),
    )
}

pub fn delivery_reminder_message(
    client_name: &str,
    bill_no: &str,
    estimated_delivery_date: NaiveDate,
    base_url: &str,
    raw_token: &str,
) -> String {
    format!(
        "Hello {client_name}, your bat (bill {bill_no}) is due for delivery on \
         {estimated_delivery_date}. Track progress: {}",
        tracking_url(base_url, raw_token),
    )
}

// =============================================================================
//  TOKEN RECOVERY
// =============================================================================

// The raw token is never stored in structured form, only hashed, so reminder
// flows recover it from previously rendered message text. Three formats are
// recognized; if the templates ever drift away from all three, recovery
// silently stops working.
static TOKEN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"Tracking token:\s*([A-Za-z0-9]{6,20})").expect("static regex"),
        Regex::new(r"/track/([A-Za-z0-9]{6,20})").expect("static regex"),
        Regex::new(r"[?&]token=([A-Za-z0-9]{6,20})").expect("static regex"),
    ]
});

/// Scan message texts (newest first) for an embedded tracking token.
pub fn extract_tracking_token<'a, I>(messages: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    for message in messages {
        for pattern in TOKEN_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(message) {
                return Some(captures[1].to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn token_recovered_from_explicit_marker() {
        let msg = "Your bat is ready. Tracking token: Ab3xY9kQ2z";
        assert_eq!(extract_tracking_token([msg]), Some("Ab3xY9kQ2z".to_string()));
    }

    #[test]
    fn token_recovered_from_url_path() {
        let msg = "Track progress: https://repairs.example.com/track/Ab3xY9kQ2z.";
        assert_eq!(extract_tracking_token([msg]), Some("Ab3xY9kQ2z".to_string()));
    }

    #[test]
    fn token_recovered_from_query_parameter() {
        let msg = "See https://repairs.example.com/status?token=Ab3xY9kQ2z for updates";
        assert_eq!(extract_tracking_token([msg]), Some("Ab3xY9kQ2z".to_string()));
    }

    #[test]
    fn no_token_in_plain_text() {
        assert_eq!(extract_tracking_token(["Your bat is ready for pickup"]), None);
        assert_eq!(extract_tracking_token(std::iter::empty::<&str>()), None);
    }

    #[test]
    fn first_message_with_a_token_wins() {
        let newest = "Reminder: visit https://x.example/track/NewerTok99";
        let older = "Tracking token: OlderTok11";
        assert_eq!(
            extract_tracking_token([newest, older]),
            Some("NewerTok99".to_string())
        );
    }

    #[test]
    fn created_message_is_recoverable_by_the_scanner() {
        let date = "2026-02-18".parse().unwrap();
        let msg = repair_created_message(
            "Nuwan",
            "B-1042",
            date,
            "https://repairs.example.com",
            "Ab3xY9kQ2z",
        );
        assert_eq!(extract_tracking_token([msg.as_str()]), Some("Ab3xY9kQ2z".to_string()));
        assert!(msg.contains("B-1042"));
        assert!(msg.contains("2026-02-18"));
    }

    #[test]
    fn reminder_message_references_due_date_and_url() {
        let date = "2026-02-20".parse().unwrap();
        let msg = delivery_reminder_message(
            "Nuwan",
            "B-1042",
            date,
            "https://repairs.example.com/",
            "Ab3xY9kQ2z",
        );
        assert!(msg.contains("2026-02-20"));
        assert!(msg.contains("https://repairs.example.com/track/Ab3xY9kQ2z"));
    }

    struct FlakyProvider {
        calls: AtomicUsize,
        fail_first: bool,
        fail_all: bool,
    }

    #[async_trait]
    impl SmsProvider for FlakyProvider {
        async fn send(&self, _recipient: &str, _message: &str) -> Result<String, anyhow::Error> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_all || (self.fail_first && call == 0) {
                Err(anyhow::anyhow!("gateway timeout"))
            } else {
                Ok("OK".to_string())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_retries_exactly_once_then_succeeds() {
        let provider = FlakyProvider {
            calls: AtomicUsize::new(0),
            fail_first: true,
            fail_all: false,
        };
        let result = dispatch_with_retry(&provider, "0771234567", "hi").await;
        assert_eq!(result.unwrap(), "OK");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_gives_up_after_the_single_retry() {
        let provider = FlakyProvider {
            calls: AtomicUsize::new(0),
            fail_first: false,
            fail_all: true,
        };
        let result = dispatch_with_retry(&provider, "0771234567", "hi").await;
        assert!(result.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dispatch_does_not_retry_on_success() {
        let provider = FlakyProvider {
            calls: AtomicUsize::new(0),
            fail_first: false,
            fail_all: false,
        };
        dispatch_with_retry(&provider, "0771234567", "hi").await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
