//! Signed base connection shared by every operation.
//!
//! # Design
//! A `Connection` is an immutable credential snapshot: base URL plus the
//! `sdkappid`, `identifier`, `usersig`, `random` and `contenttype` query
//! parameters. `TimClient` builds a new one for every request so the usersig
//! and nonce never go stale; nothing here touches the network.

use tracing::debug;
use url::Url;

use crate::config::TimConfig;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::sign::Signer;

#[derive(Debug, Clone)]
pub struct Connection {
    base_url: String,
    params: Vec<(&'static str, String)>,
}

impl Connection {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credential query parameters, in wire order.
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Compose `{base_url}{path}` with the credential query attached.
    pub fn request(&self, path: &str, body: String) -> Result<HttpRequest, ApiError> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| ApiError::Configuration(format!("invalid path {path}: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(HttpRequest {
            path: path.to_string(),
            url: url.into(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        })
    }
}

pub struct ConnectionBuilder<'a> {
    config: &'a TimConfig,
    signer: &'a dyn Signer,
    nonce: Option<u32>,
}

impl<'a> ConnectionBuilder<'a> {
    pub fn new(config: &'a TimConfig, signer: &'a dyn Signer) -> Self {
        Self {
            config,
            signer,
            nonce: None,
        }
    }

    /// Pin the nonce instead of drawing one at random.
    pub fn nonce(mut self, nonce: u32) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn build(self) -> Result<Connection, ApiError> {
        self.config.validate()?;
        let base_url = self.config.base_url.trim_end_matches('/').to_string();
        let usersig = self.signer.sign(&self.config.admin_account)?;
        let nonce = self.nonce.unwrap_or_else(rand::random::<u32>);
        debug!(app_id = self.config.app_id, nonce, "built signed connection");

        Ok(Connection {
            base_url,
            params: vec![
                ("sdkappid", self.config.app_id.to_string()),
                ("identifier", self.config.admin_account.clone()),
                ("usersig", usersig),
                ("random", nonce.to_string()),
                ("contenttype", "json".to_string()),
            ],
        })
    }
}
