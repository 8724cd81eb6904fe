//! Reqwest-backed catalog client adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping. The catalog's wire conventions are the hosted
//! platform's: locations live under `api/catalog/locations`, refreshes go
//! through `api/catalog/refresh` with an `entityRef`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{EntityDocument, EntityKind};
use crate::domain::ports::{CatalogClient, CatalogError};

/// Catalog client performing HTTP requests against one base URL.
pub struct HttpCatalogClient {
    client: Client,
    base: Url,
}

impl HttpCatalogClient {
    /// Build a client with an explicit request timeout.
    ///
    /// `base` is the catalog service origin; a missing trailing slash is
    /// added so endpoint paths join underneath it.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: ensure_trailing_slash(base),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base
            .join(path)
            .map_err(|err| CatalogError::transport(format!("invalid catalog endpoint: {err}")))
    }
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn map_transport(err: reqwest::Error) -> CatalogError {
    CatalogError::transport(err.to_string())
}

async fn expect_success(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(CatalogError::status(status.as_u16(), message))
    }
}

#[derive(Debug, Deserialize)]
struct LocationEnvelopeDto {
    data: LocationDto,
}

#[derive(Debug, Deserialize)]
struct LocationDto {
    target: String,
}

#[derive(Debug, Serialize)]
struct AddLocationDto<'a> {
    #[serde(rename = "type")]
    location_type: &'a str,
    target: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshDto<'a> {
    entity_ref: &'a str,
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_locations(&self) -> Result<Vec<String>, CatalogError> {
        let response = self
            .client
            .get(self.endpoint("api/catalog/locations")?)
            .send()
            .await
            .map_err(map_transport)?;
        let envelopes: Vec<LocationEnvelopeDto> = expect_success(response)
            .await?
            .json()
            .await
            .map_err(|err| CatalogError::transport(format!("invalid locations payload: {err}")))?;
        Ok(envelopes
            .into_iter()
            .map(|envelope| envelope.data.target)
            .collect())
    }

    async fn add_location(&self, target: &str) -> Result<(), CatalogError> {
        let response = self
            .client
            .post(self.endpoint("api/catalog/locations")?)
            .json(&AddLocationDto {
                location_type: "url",
                target,
            })
            .send()
            .await
            .map_err(map_transport)?;
        expect_success(response).await.map(|_| ())
    }

    async fn refresh_entity(&self, kind: EntityKind, name: &str) -> Result<(), CatalogError> {
        let entity_ref = kind.entity_ref(name);
        let response = self
            .client
            .post(self.endpoint("api/catalog/refresh")?)
            .json(&RefreshDto {
                entity_ref: &entity_ref,
            })
            .send()
            .await
            .map_err(map_transport)?;
        expect_success(response).await.map(|_| ())
    }

    async fn register_entity(&self, document: &EntityDocument) -> Result<(), CatalogError> {
        let response = self
            .client
            .post(self.endpoint("api/catalog/entities")?)
            .json(document)
            .send()
            .await
            .map_err(map_transport)?;
        expect_success(response).await.map(|_| ())
    }

    async fn remove_entity(&self, kind: EntityKind, name: &str) -> Result<(), CatalogError> {
        let path = format!("api/catalog/entities/by-name/{}/default/{name}", kind.slug());
        let response = self
            .client
            .delete(self.endpoint(&path)?)
            .send()
            .await
            .map_err(map_transport)?;
        expect_success(response).await.map(|_| ())
    }
}
