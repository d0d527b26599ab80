//! Shared HTTP client and the principal lookup endpoint.

use std::collections::HashSet;

use async_trait::async_trait;
use iam_core::{BackendError, Principal, PrincipalView};
use iam_engine::PrincipalService;
use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{status_error, transport_error};
use crate::wire::{BatchGetPrincipalsRequest, BatchGetPrincipalsResponse};
use crate::{HttpClientResult, IamClientConfig, ResourceKind, ResourcePolicyClient};

/// HTTP client for the IAM service.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct IamHttpClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl IamHttpClient {
    /// Build a client from validated configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the underlying
    /// HTTP client cannot be built.
    pub fn new(config: &IamClientConfig) -> HttpClientResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: Url::parse(&config.base_url)?,
            api_token: config.api_token.clone(),
        })
    }

    /// Service root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Policy client for one resource.
    #[must_use]
    pub fn resource(&self, kind: ResourceKind, id: impl Into<String>) -> ResourcePolicyClient {
        ResourcePolicyClient::new(self.clone(), kind, id)
    }

    /// Policy client for an organization.
    #[must_use]
    pub fn organization(&self, org_id: impl Into<String>) -> ResourcePolicyClient {
        self.resource(ResourceKind::Organization, org_id)
    }

    /// Policy client for a project.
    #[must_use]
    pub fn project(&self, project_id: impl Into<String>) -> ResourcePolicyClient {
        self.resource(ResourceKind::Project, project_id)
    }

    /// Policy client for a group.
    #[must_use]
    pub fn group(&self, group_id: impl Into<String>) -> ResourcePolicyClient {
        self.resource(ResourceKind::Group, group_id)
    }

    /// `{base}/v1/{segments...}`, each segment percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BackendError::Transport(format!("base url {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        debug!(%url, "GET");
        self.send(self.http.get(url)).await
    }

    pub(crate) async fn put_json<B, T>(&self, url: Url, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%url, "PUT");
        self.send(self.http.put(url).json(body)).await
    }

    pub(crate) async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%url, "POST");
        self.send(self.http.post(url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let request = match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "IAM request failed");
            return Err(status_error(status, body));
        }

        response.json::<T>().await.map_err(|e| transport_error(&e))
    }
}

#[async_trait]
impl PrincipalService for IamHttpClient {
    async fn batch_get_principals(
        &self,
        org_id: &str,
        principal_ids: &[String],
        view: PrincipalView,
    ) -> Result<Vec<Principal>, BackendError> {
        let url = self.endpoint(&["organizations", org_id, "principals:batchGet"])?;
        let mut principals = Vec::with_capacity(principal_ids.len());
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let request = BatchGetPrincipalsRequest {
                principal_ids,
                view,
                page_token: page_token.as_deref(),
            };
            let page: BatchGetPrincipalsResponse = self.post_json(url.clone(), &request).await?;
            principals.extend(page.principals.into_iter().map(Principal::from));

            if page.next_page_token.is_empty() {
                break;
            }
            if !seen_tokens.insert(page.next_page_token.clone()) {
                warn!(token = %page.next_page_token, "Principal lookup repeated a page token");
                return Err(BackendError::Transport(format!(
                    "principal lookup returned page token {} twice",
                    page.next_page_token
                )));
            }
            debug!(received = principals.len(), "Fetching next principal page");
            page_token = Some(page.next_page_token);
        }

        Ok(principals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> IamHttpClient {
        IamHttpClient::new(&IamClientConfig::new(base, "org-1")).unwrap()
    }

    #[test]
    fn endpoint_appends_to_root() {
        let url = client("https://iam.example.com")
            .endpoint(&["projects", "p-1", "iam-policy"])
            .unwrap();
        assert_eq!(url.as_str(), "https://iam.example.com/v1/projects/p-1/iam-policy");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = client("https://gw.example.com/iam/")
            .endpoint(&["organizations", "o", "principals:batchGet"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://gw.example.com/iam/v1/organizations/o/principals:batchGet"
        );
    }

    #[test]
    fn endpoint_escapes_ids() {
        let url = client("https://iam.example.com")
            .endpoint(&["groups", "a/b c", "iam-policy"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://iam.example.com/v1/groups/a%2Fb%20c/iam-policy"
        );
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(IamHttpClient::new(&IamClientConfig::new("https://iam.example.com", "")).is_err());
    }
}
