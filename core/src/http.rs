//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! builds `HttpRequest` values and parses `HttpResponse` values; executing the
//! request is the job of a `Transport` (or of the caller directly).
//!
//! Every admin API call is a POST with a JSON body, so the request carries no
//! method field.

/// A signed POST request described as plain data.
///
/// `url` already carries the credential query parameters. `path` is the
/// operation sub-path, kept separately for logging and routing.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub path: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// Look up a query parameter on the composed URL.
    pub fn query_param(&self, key: &str) -> Option<String> {
        let url = url::Url::parse(&self.url).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
