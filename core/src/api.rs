//! One call per admin operation: build, execute, parse.

use std::time::Duration;

use tracing::{debug, warn};

use crate::client::TimClient;
use crate::config::TimConfig;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::transport::{Transport, UreqTransport};
use crate::types::{ChatType, Envelope, ImportMsg, ProfileItem};

/// `TimClient` paired with a blocking transport.
///
/// Every method returns the decoded envelope on any 2xx status. Check
/// `Envelope::is_ok` (or call `Envelope::into_result`) for the service's own
/// verdict.
pub struct TimApi<T = UreqTransport> {
    client: TimClient,
    transport: T,
}

impl TimApi<UreqTransport> {
    pub fn new(config: TimConfig) -> Self {
        let transport = UreqTransport::new(Duration::from_secs(config.timeout_secs));
        Self::with_transport(TimClient::new(config), transport)
    }
}

impl<T: Transport> TimApi<T> {
    pub fn with_transport(client: TimClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TimClient {
        &self.client
    }

    fn call(&self, request: HttpRequest) -> Result<Envelope, ApiError> {
        debug!(path = %request.path, "calling admin api");
        let response = self.transport.execute(&request)?;
        if !response.is_success() {
            warn!(path = %request.path, status = response.status, "admin api returned non-2xx");
        }
        self.client.parse_envelope(response)
    }

    pub fn account_import(
        &self,
        identifier: impl ToString,
        nick: Option<&str>,
        face_url: Option<&str>,
    ) -> Result<Envelope, ApiError> {
        self.call(self.client.build_account_import(identifier, nick, face_url)?)
    }

    pub fn multi_account_import<I: ToString>(&self, accounts: &[I]) -> Result<Envelope, ApiError> {
        self.call(self.client.build_multi_account_import(accounts)?)
    }

    pub fn account_delete<I: ToString>(&self, accounts: &[I]) -> Result<Envelope, ApiError> {
        self.call(self.client.build_account_delete(accounts)?)
    }

    pub fn account_check<I: ToString>(&self, accounts: &[I]) -> Result<Envelope, ApiError> {
        self.call(self.client.build_account_check(accounts)?)
    }

    pub fn kick(&self, identifier: impl ToString) -> Result<Envelope, ApiError> {
        self.call(self.client.build_kick(identifier)?)
    }

    pub fn query_state<I: ToString>(&self, accounts: &[I], need_detail: bool) -> Result<Envelope, ApiError> {
        self.call(self.client.build_query_state(accounts, need_detail)?)
    }

    pub fn import_msg(&self, msg: &ImportMsg) -> Result<Envelope, ApiError> {
        self.call(self.client.build_import_msg(msg)?)
    }

    pub fn msg_withdraw(
        &self,
        from_account: impl ToString,
        to_account: impl ToString,
        msg_key: &str,
    ) -> Result<Envelope, ApiError> {
        self.call(self.client.build_msg_withdraw(from_account, to_account, msg_key)?)
    }

    pub fn portrait_set(&self, from_account: impl ToString, items: &[ProfileItem]) -> Result<Envelope, ApiError> {
        self.call(self.client.build_portrait_set(from_account, items)?)
    }

    pub fn portrait_get<I: ToString>(&self, accounts: &[I], tags: &[&str]) -> Result<Envelope, ApiError> {
        self.call(self.client.build_portrait_get(accounts, tags)?)
    }

    pub fn fetch_app_info(&self, fields: &[&str]) -> Result<Envelope, ApiError> {
        self.call(self.client.build_fetch_app_info(fields)?)
    }

    pub fn fetch_history(&self, chat_type: ChatType, msg_time: &str) -> Result<Envelope, ApiError> {
        self.call(self.client.build_fetch_history(chat_type, msg_time)?)
    }

    pub fn fetch_ip_list(&self) -> Result<Envelope, ApiError> {
        self.call(self.client.build_fetch_ip_list()?)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;

    use super::*;
    use crate::http::HttpResponse;
    use crate::sign::Signer;

    struct FixedSigner;

    impl Signer for FixedSigner {
        fn sign(&self, _identifier: &str) -> Result<String, ApiError> {
            Ok("sig".to_string())
        }
    }

    /// Records every request and answers with a canned response.
    struct CannedTransport {
        status: u16,
        body: &'static str,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for CannedTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.to_string(),
            })
        }
    }

    fn api(status: u16, body: &'static str) -> TimApi<CannedTransport> {
        let config = TimConfig::new(1, "admin", "key").with_base_url("http://localhost:3000");
        let client = TimClient::with_signer(config, Arc::new(FixedSigner));
        TimApi::with_transport(client, CannedTransport::new(status, body))
    }

    #[test]
    fn server_error_is_raised_for_every_operation() {
        let api = api(500, "");
        let results = [
            api.account_import("u1", None, None),
            api.multi_account_import(&["a"]),
            api.account_delete(&["a"]),
            api.account_check(&["a"]),
            api.kick("a"),
            api.query_state(&["a"], false),
            api.import_msg(&ImportMsg::new("a", "b", 1, 1557387418, Vec::new())),
            api.msg_withdraw("a", "b", "k"),
            api.portrait_set("a", &[]),
            api.portrait_get(&["a"], &["Tag_Profile_IM_Nick"]),
            api.fetch_app_info(&[]),
            api.fetch_history(ChatType::Group, "2015120121"),
            api.fetch_ip_list(),
        ];
        for result in results {
            let err = result.unwrap_err();
            assert!(matches!(err, ApiError::TimServer { status: 500, .. }));
            assert!(err.to_string().contains("500"));
        }
        assert_eq!(api.transport.seen.borrow().len(), 13);
    }

    #[test]
    fn success_returns_decoded_envelope() {
        let api = api(200, r#"{"ActionStatus":"OK","ErrorCode":0,"IPList":["1.1.1.1"]}"#);
        let envelope = api.fetch_ip_list().unwrap();
        assert_eq!(envelope.get("IPList").unwrap()[0], "1.1.1.1");

        let seen = api.transport.seen.borrow();
        assert_eq!(seen[0].body, "{}");
        assert_eq!(seen[0].path, crate::client::GET_IP_LIST);
    }

    #[test]
    fn configuration_error_skips_network() {
        let config = TimConfig::new(0, "admin", "key");
        let client = TimClient::with_signer(config, Arc::new(FixedSigner));
        let api = TimApi::with_transport(client, CannedTransport::new(200, "{}"));
        assert!(matches!(api.kick("a").unwrap_err(), ApiError::Configuration(_)));
        assert!(api.transport.seen.borrow().is_empty());
    }
}
