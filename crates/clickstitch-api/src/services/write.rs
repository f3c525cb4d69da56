// Write service orchestration
//
// validate -> resolve -> stamp -> publish, in that order. A rejected
// origin aborts before any session work; once the stamp is spent on a
// publish attempt there is no compensating action.

use chrono::Utc;
use std::sync::Arc;

use clickstitch_core::{
    EventPublisher, OriginValidator, Result, SessionResolver, SessionStamp, TrackedEvent,
};

/// Origin credentials accompanying every inbound event.
#[derive(Debug, Clone)]
pub struct Origin {
    pub application_token: String,
    pub application_url: String,
}

pub struct WriteService {
    validator: Arc<dyn OriginValidator>,
    resolver: SessionResolver,
    publisher: Arc<dyn EventPublisher>,
}

impl WriteService {
    pub fn new(
        validator: Arc<dyn OriginValidator>,
        resolver: SessionResolver,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            validator,
            resolver,
            publisher,
        }
    }

    /// Handle one inbound event end to end, returning the stamp it was
    /// forwarded with.
    pub async fn write(&self, origin: &Origin, event: TrackedEvent) -> Result<SessionStamp> {
        self.validator
            .validate(&origin.application_token, &origin.application_url)
            .await?;

        let stamp = self
            .resolver
            .resolve(event.kind, &event.cookie_id, Utc::now())
            .await?;

        let enriched = event.stamped(stamp.clone());
        self.publisher
            .publish(enriched.kind.topic(), &enriched)
            .await?;

        Ok(stamp)
    }
}
