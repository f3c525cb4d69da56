// Application registry client
//
// The registry answers whether a token/URL pair belongs to a registered
// application. 2xx means registered, 4xx means rejected; anything else
// is the registry's problem, not the caller's.

use anyhow::anyhow;
use async_trait::async_trait;
use serde::Serialize;

use clickstitch_core::{OriginValidator, Result, WriteError};

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    application_token: &'a str,
    application_url: &'a str,
}

pub struct RegistryValidator {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryValidator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl OriginValidator for RegistryValidator {
    async fn validate(&self, application_token: &str, application_url: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/v1/applications/verify", self.base_url))
            .json(&VerifyRequest {
                application_token,
                application_url,
            })
            .send()
            .await
            .map_err(|e| WriteError::Internal(anyhow!("application registry unreachable: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_client_error() {
            Err(WriteError::rejected(format!(
                "registry rejected origin ({status})"
            )))
        } else {
            Err(WriteError::Internal(anyhow!(
                "application registry answered {status}"
            )))
        }
    }
}
