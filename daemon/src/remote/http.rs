//! REST document store client.
//!
//! Expects the store to expose the collection as
//! `GET/POST {base}/{collection}` and `DELETE {base}/{collection}/{id}`,
//! exchanging records as camelCase JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use tether_engine::{NewRecord, Record};

use super::{OrderKey, RemoteError, RemoteStore};

/// Remote store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    collection_url: Url,
}

impl HttpRemoteStore {
    /// Create a client for `{base_url}/{collection}`.
    ///
    /// `timeout` bounds every request so a dead network fails fast instead of
    /// hanging the caller.
    pub fn new(base_url: &str, collection: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let mut collection_url = Url::parse(base_url)
            .map_err(|e| RemoteError::InvalidRequest(format!("bad base url '{base_url}': {e}")))?;
        collection_url
            .path_segments_mut()
            .map_err(|_| RemoteError::InvalidRequest(format!("base url '{base_url}' cannot hold a path")))?
            .pop_if_empty()
            .push(collection);

        Ok(Self {
            client,
            collection_url,
        })
    }

    /// URL of the collection endpoint.
    pub fn collection_url(&self) -> &str {
        self.collection_url.as_str()
    }

    /// URL of one record, with the id encoded as a single path segment.
    fn record_url(&self, id: &str) -> Result<Url, RemoteError> {
        // `.` and `..` would be dropped by path normalization
        if id.is_empty() || id == "." || id == ".." {
            return Err(RemoteError::InvalidRequest(format!("invalid record id '{id}'")));
        }

        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidRequest(format!("invalid record id '{id}'")))?
            .push(id);
        Ok(url)
    }
}

/// Turn a non-2xx response into a [`RemoteError::Status`].
async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(RemoteError::Status {
        status: status.as_u16(),
        message,
    })
}

fn network(e: reqwest::Error) -> RemoteError {
    RemoteError::Network(e.to_string())
}

fn decode(e: reqwest::Error) -> RemoteError {
    RemoteError::Decode(e.to_string())
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list(&self, order: OrderKey) -> Result<Vec<Record>, RemoteError> {
        let response = self
            .client
            .get(self.collection_url.clone())
            .query(&order.as_query())
            .send()
            .await
            .map_err(network)?;

        ensure_success(response).await?.json().await.map_err(decode)
    }

    async fn insert(&self, payload: &NewRecord) -> Result<Record, RemoteError> {
        let response = self
            .client
            .post(self.collection_url.clone())
            .json(payload)
            .send()
            .await
            .map_err(network)?;

        ensure_success(response).await?.json().await.map_err(decode)
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let url = self.record_url(id)?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(network)?;

        // Already gone is as good as deleted.
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(record_id = %id, "Remote record already absent");
            return Ok(());
        }

        ensure_success(response).await?;
        Ok(())
    }
}
