use std::time::Duration;

use campus_relay_core::{HttpTransport, TransportError, TransportRequest, TransportResponse};
use reqwest::{Client, redirect};

/// `HttpTransport` over a reqwest client that never follows redirects and
/// keeps no cookies of its own.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    /// Wraps an existing client. The client must be built with
    /// `redirect::Policy::none()` and without a cookie store.
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }

    pub fn build(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self::new(http_client))
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    #[tracing::instrument(name = "ReqwestTransport::execute", skip_all, fields(method = %request.method, url = %request.url))]
    async fn execute(
        &self,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_error)?.to_vec();

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Response received");

        Ok(TransportResponse {
            url: request.url.clone(),
            status,
            headers,
            body,
        })
    }
}

fn map_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connection(error.to_string())
    } else {
        TransportError::Unexpected(error.to_string())
    }
}
