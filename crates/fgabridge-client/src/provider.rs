//! Lazy, process-wide client construction.
//!
//! `ClientProvider` builds exactly one [`OpenFgaClient`] per process, on
//! first use, and hands out cheap clones of it afterwards. Store-name
//! resolution happens once during construction: a store-agnostic probe
//! client lists stores and adopts the id of the exact name match. A name
//! with no match is a terminal configuration error; the provider never
//! auto-creates stores.

use crate::client::OpenFgaClient;
use crate::error::FgaError;
use fgabridge_core::FgaSettings;
use tokio::sync::RwLock;

/// Builds and caches the shared OpenFGA client.
pub struct ClientProvider {
    settings: FgaSettings,
    slot: RwLock<Option<OpenFgaClient>>,
}

impl ClientProvider {
    pub fn new(settings: FgaSettings) -> Self {
        Self {
            settings,
            slot: RwLock::new(None),
        }
    }

    /// Get the shared client, constructing it on first call.
    ///
    /// Construction failures are returned to the caller and retried on the
    /// next call; a success is cached for the process lifetime (until
    /// [`Self::close`]).
    pub async fn client(&self) -> Result<OpenFgaClient, FgaError> {
        if let Some(client) = self.slot.read().await.as_ref() {
            return Ok(client.clone());
        }

        let mut slot = self.slot.write().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = self.build().await?;
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Drop the cached client. Idempotent; safe when no client was ever
    /// constructed. The next [`Self::client`] call rebuilds from scratch.
    pub async fn close(&self) {
        if self.slot.write().await.take().is_some() {
            tracing::debug!("OpenFGA client released");
        }
    }

    async fn build(&self) -> Result<OpenFgaClient, FgaError> {
        let api_url = self.settings.api_url().ok_or_else(|| {
            FgaError::Configuration("FGA_API_HOST is not set (and no --openfga_url given)".into())
        })?;

        let store_id = match &self.settings.store_id {
            Some(id) => Some(id.clone()),
            None => match &self.settings.store_name {
                Some(name) => Some(self.resolve_store_id(&api_url, name).await?),
                None => None,
            },
        };

        tracing::info!(
            api_url = %api_url,
            store_id = store_id.as_deref().unwrap_or("<none>"),
            model_id = self.settings.authorization_model_id.as_deref().unwrap_or("<none>"),
            "OpenFGA client configured"
        );

        OpenFgaClient::new(
            api_url,
            store_id,
            self.settings.authorization_model_id.clone(),
            self.settings.request_timeout,
        )
    }

    /// Look up a store id by exact (case-sensitive) name match.
    async fn resolve_store_id(&self, api_url: &str, name: &str) -> Result<String, FgaError> {
        tracing::info!(store_name = %name, "store id not provided, looking up store by name");

        // Probe client scoped to no store: listing stores is store-agnostic.
        let probe = OpenFgaClient::new(api_url, None, None, self.settings.request_timeout)?;

        let mut continuation_token: Option<String> = None;
        loop {
            let response = probe
                .list_stores(None, continuation_token.as_deref())
                .await?;

            for store in &response.stores {
                if store.name.as_deref() == Some(name) {
                    if let Some(id) = &store.id {
                        tracing::info!(store_name = %name, store_id = %id, "resolved store by name");
                        return Ok(id.clone());
                    }
                }
            }

            match response.continuation_token.filter(|t| !t.is_empty()) {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        Err(FgaError::StoreNotFound(name.to_string()))
    }
}
