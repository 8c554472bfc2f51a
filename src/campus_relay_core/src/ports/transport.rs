use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use thiserror::Error;
use url::{Url, form_urlencoded};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },
    #[error("Invalid redirect location: {0}")]
    InvalidRedirect(String),
    #[error("Unexpected transport error: {0}")]
    Unexpected(String),
}

/// One outgoing HTTP exchange. Redirects are never followed by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// `application/x-www-form-urlencoded` request, fields kept in order.
    pub fn form<K, V>(method: Method, url: Url, fields: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in fields {
            serializer.append_pair(key.as_ref(), value.as_ref());
        }

        let mut request = Self::new(method, url);
        request.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        request.body = Some(serializer.finish().into_bytes());
        request
    }

    /// Decoded form fields of the body, in order. Empty for non-form bodies.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.body
            .as_deref()
            .map(|body| {
                form_urlencoded::parse(body)
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// URL this single exchange was made against.
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Target of a `3xx` response, resolved against the response URL.
    ///
    /// `Ok(None)` means the response is final.
    pub fn redirect_location(&self) -> Result<Option<Url>, TransportError> {
        if !matches!(self.status.as_u16(), 301 | 302 | 303 | 307 | 308) {
            return Ok(None);
        }
        let Some(location) = self.headers.get(header::LOCATION) else {
            return Ok(None);
        };
        let location = location
            .to_str()
            .map_err(|e| TransportError::InvalidRedirect(e.to_string()))?;
        self.url
            .join(location)
            .map(Some)
            .map_err(|e| TransportError::InvalidRedirect(format!("{location}: {e}")))
    }
}

/// Port for the platform HTTP client.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &TransportRequest)
    -> Result<TransportResponse, TransportError>;
}
