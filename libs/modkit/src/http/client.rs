//! `reqwest::Client` wrapper that opens an `outgoing_http` span per call.

use std::time::Duration;
use tracing::Instrument;

#[derive(Clone, Debug)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Client with a whole-request timeout (connect + response).
    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }

    pub async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let span = tracing::info_span!(
            "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = tracing::field::Empty,
        );

        async {
            let resp = self.inner.execute(req).await;
            match &resp {
                Ok(r) => {
                    tracing::Span::current().record("http.status_code", r.status().as_u16());
                    tracing::debug!(status = r.status().as_u16(), "upstream responded");
                }
                Err(e) => tracing::warn!(error = %e, "upstream request failed"),
            }
            resp
        }
        .instrument(span)
        .await
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        let req = self.inner.get(url).build()?;
        self.execute(req).await
    }

    /// Builder for requests that need headers or a body; send it with `execute`.
    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn forwards_request_and_returns_response() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/logout")
                .header("authorization", "Bearer t0k");
            then.status(204);
        });

        let client = TracedClient::with_timeout(Duration::from_secs(5)).unwrap();
        let req = client
            .request(reqwest::Method::POST, &server.url("/auth/logout"))
            .bearer_auth("t0k")
            .build()
            .unwrap();
        let resp = client.execute(req).await.unwrap();

        assert_eq!(resp.status().as_u16(), 204);
        m.assert();
    }

    #[tokio::test]
    async fn connection_errors_surface_as_err() {
        let client = TracedClient::with_timeout(Duration::from_millis(500)).unwrap();
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        assert!(client.get("http://127.0.0.1:9/health").await.is_err());
    }
}
