use std::sync::Arc;

use campus_relay_core::{
    CookieTransaction, FetchedResource, HttpTransport, TransportError, TransportRequest,
    TransportResponse,
};
use http::{HeaderValue, Method, StatusCode, header};
use url::Url;

/// Cookie-aware HTTP on top of a single-exchange transport.
///
/// Every exchange reads cookies from and records cookies into the caller's
/// [`CookieTransaction`]; nothing here touches the shared session.
pub struct SessionHttp<T> {
    transport: Arc<T>,
    max_redirects: usize,
}

impl<T> Clone for SessionHttp<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            max_redirects: self.max_redirects,
        }
    }
}

impl<T> SessionHttp<T>
where
    T: HttpTransport,
{
    pub fn new(transport: Arc<T>, max_redirects: usize) -> Self {
        Self {
            transport,
            max_redirects,
        }
    }

    /// One exchange, redirects not followed.
    pub async fn send_once(
        &self,
        request: &TransportRequest,
        cookies: &mut CookieTransaction,
    ) -> Result<TransportResponse, TransportError> {
        let mut outgoing = request.clone();
        outgoing.headers.remove(header::COOKIE);
        if let Some(cookie) = cookies.cookie_header(&outgoing.url) {
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                outgoing.headers.insert(header::COOKIE, value);
            }
        }

        tracing::debug!(method = %outgoing.method, url = %outgoing.url, "Sending request");
        let response = self.transport.execute(&outgoing).await?;
        tracing::debug!(status = %response.status, url = %response.url, "Received response");

        cookies.record_response(&response.url, &response.headers);
        Ok(response)
    }

    /// Sends `request` and follows redirects to the final response.
    pub async fn send(
        &self,
        request: TransportRequest,
        cookies: &mut CookieTransaction,
    ) -> Result<FetchedResource, TransportError> {
        let mut request = request;
        let mut redirects = 0;

        loop {
            let response = self.send_once(&request, cookies).await?;
            let Some(location) = response.redirect_location()? else {
                return Ok(FetchedResource::from_response(response, redirects));
            };

            if redirects >= self.max_redirects {
                return Err(TransportError::TooManyRedirects {
                    limit: self.max_redirects,
                });
            }
            redirects += 1;
            request = follow(request, response.status, location);
        }
    }
}

fn follow(previous: TransportRequest, status: StatusCode, location: Url) -> TransportRequest {
    let becomes_get = status == StatusCode::SEE_OTHER
        || (matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND)
            && previous.method != Method::GET
            && previous.method != Method::HEAD);

    if becomes_get {
        let mut next = TransportRequest::get(location);
        next.headers = previous.headers;
        next.headers.remove(header::CONTENT_TYPE);
        next.headers.remove(header::CONTENT_LENGTH);
        return next;
    }

    TransportRequest {
        url: location,
        ..previous
    }
}
