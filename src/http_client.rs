use crate::error::{BodySnafu, ClientBuildSnafu, FailedRequestSnafu, Result, TransportSnafu};
use reqwest::{Client, IntoUrl};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use reqwest_tracing::TracingMiddleware;
use serde::{Serialize, de::DeserializeOwned};
use snafu::ResultExt;
use std::time::Duration;

/// Traced HTTP client that retries transient failures with exponential backoff.
#[derive(Debug, Clone)]
pub struct HttpClient(ClientWithMiddleware);

#[derive(Default, Debug)]
pub struct HttpClientBuilder {
    client: reqwest::ClientBuilder,
    max_retries: u32,
}

impl HttpClient {
    fn new_with(inner: Client, max_retries: u32) -> Self {
        let client = ClientBuilder::new(inner)
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(
                ExponentialBackoff::builder().build_with_max_retries(max_retries),
            ))
            .build();

        Self(client)
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// GETs `url` and decodes a JSON body. Non-2xx responses become `FailedRequest`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: impl IntoUrl,
        query: &impl Serialize,
    ) -> Result<T> {
        let response = self.0.get(url).query(query).send().await.context(TransportSnafu)?;

        let status = response.status();
        if !status.is_success() {
            // the query string carries the access key
            let mut url = response.url().clone();
            url.set_query(None);
            return FailedRequestSnafu {
                url,
                status,
                body: response.text().await.context(BodySnafu)?,
            }
            .fail();
        }

        response.json().await.context(BodySnafu)
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.timeout(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let inner = self.client.build().context(ClientBuildSnafu)?;
        Ok(HttpClient::new_with(inner, self.max_retries))
    }
}
