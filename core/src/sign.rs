//! Usersig generation.
//!
//! # Design
//! The connection layer only depends on the `Signer` trait, so tests and
//! callers with their own signing service can plug in a different
//! implementation. `TlsSigV2` produces the platform's version 2 usersig:
//! an HMAC-SHA256 over a fixed text layout, wrapped in a JSON document that
//! is zlib-compressed and base64-encoded with URL-safe substitutions.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::config::TimConfig;
use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Produces the usersig proving administrative identity.
pub trait Signer: Send + Sync {
    fn sign(&self, identifier: &str) -> Result<String, ApiError>;
}

#[derive(Clone)]
pub struct TlsSigV2 {
    app_id: u64,
    key: String,
    expire_secs: u64,
}

impl TlsSigV2 {
    pub fn new(app_id: u64, key: &str, expire_secs: u64) -> Self {
        Self {
            app_id,
            key: key.to_string(),
            expire_secs,
        }
    }

    pub fn from_config(config: &TimConfig) -> Self {
        Self::new(config.app_id, &config.secret_key, config.sig_expire_secs)
    }

    /// Sign `identifier` as if the current time were `time` (unix seconds).
    pub fn sign_at(&self, identifier: &str, time: u64) -> Result<String, ApiError> {
        if identifier.is_empty() {
            return Err(ApiError::Signing("identifier is empty".to_string()));
        }
        if self.key.is_empty() {
            return Err(ApiError::Signing("secret key is empty".to_string()));
        }

        let sig = self.hmac_base64(identifier, time)?;
        let doc = json!({
            "TLS.ver": "2.0",
            "TLS.identifier": identifier,
            "TLS.sdkappid": self.app_id,
            "TLS.expire": self.expire_secs,
            "TLS.time": time,
            "TLS.sig": sig,
        });
        let doc = serde_json::to_vec(&doc).map_err(|e| ApiError::Serialization(e.to_string()))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&doc)
            .map_err(|e| ApiError::Signing(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| ApiError::Signing(e.to_string()))?;

        Ok(url_safe(&STANDARD.encode(compressed)))
    }

    fn hmac_base64(&self, identifier: &str, time: u64) -> Result<String, ApiError> {
        let content = format!(
            "TLS.identifier:{identifier}\nTLS.sdkappid:{}\nTLS.time:{time}\nTLS.expire:{}\n",
            self.app_id, self.expire_secs
        );
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.key.as_bytes())
            .map_err(|e| ApiError::Signing(e.to_string()))?;
        mac.update(content.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl Signer for TlsSigV2 {
    fn sign(&self, identifier: &str) -> Result<String, ApiError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ApiError::Signing(e.to_string()))?
            .as_secs();
        self.sign_at(identifier, now)
    }
}

fn url_safe(encoded: &str) -> String {
    encoded
        .chars()
        .map(|c| match c {
            '+' => '*',
            '/' => '-',
            '=' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::ZlibDecoder;

    use super::*;

    fn decode(usersig: &str) -> serde_json::Value {
        let standard: String = usersig
            .chars()
            .map(|c| match c {
                '*' => '+',
                '-' => '/',
                '_' => '=',
                other => other,
            })
            .collect();
        let compressed = STANDARD.decode(standard).unwrap();
        let mut doc = String::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_string(&mut doc)
            .unwrap();
        serde_json::from_str(&doc).unwrap()
    }

    #[test]
    fn usersig_decodes_to_expected_document() {
        let signer = TlsSigV2::new(1400000000, "secret", 86400);
        let doc = decode(&signer.sign_at("admin", 1_700_000_000).unwrap());

        assert_eq!(doc["TLS.ver"], "2.0");
        assert_eq!(doc["TLS.identifier"], "admin");
        assert_eq!(doc["TLS.sdkappid"], 1400000000u64);
        assert_eq!(doc["TLS.expire"], 86400);
        assert_eq!(doc["TLS.time"], 1_700_000_000u64);
        assert_eq!(
            doc["TLS.sig"],
            signer.hmac_base64("admin", 1_700_000_000).unwrap()
        );
    }

    #[test]
    fn sign_at_is_deterministic() {
        let signer = TlsSigV2::new(1, "secret", 60);
        assert_eq!(
            signer.sign_at("admin", 42).unwrap(),
            signer.sign_at("admin", 42).unwrap()
        );
        assert_ne!(
            signer.sign_at("admin", 42).unwrap(),
            signer.sign_at("other", 42).unwrap()
        );
    }

    #[test]
    fn usersig_is_url_safe() {
        let usersig = TlsSigV2::new(1, "secret", 60).sign_at("admin", 42).unwrap();
        assert!(!usersig.contains(['+', '/', '=']));
    }

    #[test]
    fn hmac_differs_per_key() {
        let a = TlsSigV2::new(1, "one", 60).hmac_base64("admin", 42).unwrap();
        let b = TlsSigV2::new(1, "two", 60).hmac_base64("admin", 42).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_identifier_fails() {
        let err = TlsSigV2::new(1, "secret", 60).sign("").unwrap_err();
        assert!(matches!(err, ApiError::Signing(_)));
    }

    #[test]
    fn empty_key_fails() {
        let err = TlsSigV2::new(1, "", 60).sign("admin").unwrap_err();
        assert!(matches!(err, ApiError::Signing(_)));
    }
}
