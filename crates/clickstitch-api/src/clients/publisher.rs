// Downstream forwarder client
//
// Enriched events go out over HTTP, one topic path per event kind. The
// forwarder owns delivery semantics from there.

use async_trait::async_trait;

use clickstitch_core::{EnrichedEvent, EventPublisher, Result, WriteError};

pub struct HttpEventPublisher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEventPublisher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for HttpEventPublisher {
    async fn publish(&self, topic: &str, event: &EnrichedEvent) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/v1/topics/{topic}", self.base_url))
            .json(event)
            .send()
            .await
            .map_err(|e| WriteError::publish(format!("forwarder unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WriteError::publish(format!(
                "forwarder answered {status} for topic {topic}"
            )));
        }

        tracing::debug!(topic, activity_id = %event.activity_id, "event forwarded");
        Ok(())
    }
}
