//! Request builders and the uniform response contract.
//!
//! # Design
//! `TimClient` holds configuration and a signer but no connection. Each
//! `build_*` method signs afresh through `ConnectionBuilder`, serializes the
//! operation's body and returns an `HttpRequest`. Every response, whatever the
//! operation, goes through `parse_envelope`.

use std::sync::Arc;

use serde::Serialize;

use crate::config::TimConfig;
use crate::connection::{Connection, ConnectionBuilder};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::sign::{Signer, TlsSigV2};
use crate::types::{
    AccountCheck, AccountDelete, AccountImport, ChatType, Envelope, GetAppInfo, GetHistory, GetIpList, ImportMsg,
    Kick, MsgWithdraw, MultiAccountImport, PortraitGet, PortraitSet, ProfileItem, QueryState,
};

pub const ACCOUNT_IMPORT: &str = "/v4/im_open_login_svc/account_import";
pub const MULTI_ACCOUNT_IMPORT: &str = "/v4/im_open_login_svc/multiaccount_import";
pub const ACCOUNT_DELETE: &str = "/v4/im_open_login_svc/account_delete";
pub const ACCOUNT_CHECK: &str = "/v4/im_open_login_svc/account_check";
pub const KICK: &str = "/v4/im_open_login_svc/kick";
pub const QUERY_STATE: &str = "/v4/openim/querystate";
pub const IMPORT_MSG: &str = "/v4/openim/importmsg";
pub const MSG_WITHDRAW: &str = "/v4/openim/admin_msgwithdraw";
pub const PORTRAIT_SET: &str = "/v4/profile/portrait_set";
pub const PORTRAIT_GET: &str = "/v4/profile/portrait_get";
pub const GET_APP_INFO: &str = "/v4/openconfigsvr/getappinfo";
pub const GET_HISTORY: &str = "/v4/open_msg_svc/get_history";
pub const GET_IP_LIST: &str = "/v4/ConfigSvc/GetIPList";

/// Builds signed requests for the admin API. Cheap to clone.
#[derive(Clone)]
pub struct TimClient {
    config: TimConfig,
    signer: Arc<dyn Signer>,
}

impl TimClient {
    /// Client signing with `TlsSigV2` derived from `config`.
    pub fn new(config: TimConfig) -> Self {
        let signer = Arc::new(TlsSigV2::from_config(&config));
        Self { config, signer }
    }

    pub fn with_signer(config: TimConfig, signer: Arc<dyn Signer>) -> Self {
        Self { config, signer }
    }

    pub fn config(&self) -> &TimConfig {
        &self.config
    }

    /// A freshly signed connection with a new nonce.
    pub fn connection(&self) -> Result<Connection, ApiError> {
        ConnectionBuilder::new(&self.config, self.signer.as_ref()).build()
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let connection = self.connection()?;
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        connection.request(path, body)
    }

    pub fn build_account_import(
        &self,
        identifier: impl ToString,
        nick: Option<&str>,
        face_url: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        self.post(ACCOUNT_IMPORT, &AccountImport::new(identifier, nick, face_url))
    }

    pub fn build_multi_account_import<I: ToString>(&self, accounts: &[I]) -> Result<HttpRequest, ApiError> {
        self.post(MULTI_ACCOUNT_IMPORT, &MultiAccountImport::new(accounts))
    }

    pub fn build_account_delete<I: ToString>(&self, accounts: &[I]) -> Result<HttpRequest, ApiError> {
        self.post(ACCOUNT_DELETE, &AccountDelete::new(accounts))
    }

    pub fn build_account_check<I: ToString>(&self, accounts: &[I]) -> Result<HttpRequest, ApiError> {
        self.post(ACCOUNT_CHECK, &AccountCheck::new(accounts))
    }

    pub fn build_kick(&self, identifier: impl ToString) -> Result<HttpRequest, ApiError> {
        self.post(
            KICK,
            &Kick {
                identifier: identifier.to_string(),
            },
        )
    }

    pub fn build_query_state<I: ToString>(&self, accounts: &[I], need_detail: bool) -> Result<HttpRequest, ApiError> {
        self.post(QUERY_STATE, &QueryState::new(accounts, need_detail))
    }

    pub fn build_import_msg(&self, msg: &ImportMsg) -> Result<HttpRequest, ApiError> {
        self.post(IMPORT_MSG, msg)
    }

    pub fn build_msg_withdraw(
        &self,
        from_account: impl ToString,
        to_account: impl ToString,
        msg_key: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.post(
            MSG_WITHDRAW,
            &MsgWithdraw {
                from_account: from_account.to_string(),
                to_account: to_account.to_string(),
                msg_key: msg_key.to_string(),
            },
        )
    }

    pub fn build_portrait_set(
        &self,
        from_account: impl ToString,
        items: &[ProfileItem],
    ) -> Result<HttpRequest, ApiError> {
        self.post(
            PORTRAIT_SET,
            &PortraitSet {
                from_account: from_account.to_string(),
                profile_item: items.to_vec(),
            },
        )
    }

    pub fn build_portrait_get<I: ToString>(&self, accounts: &[I], tags: &[&str]) -> Result<HttpRequest, ApiError> {
        self.post(
            PORTRAIT_GET,
            &PortraitGet {
                to_account: accounts.iter().map(ToString::to_string).collect(),
                tag_list: tags.iter().map(|t| t.to_string()).collect(),
            },
        )
    }

    pub fn build_fetch_app_info(&self, fields: &[&str]) -> Result<HttpRequest, ApiError> {
        self.post(
            GET_APP_INFO,
            &GetAppInfo {
                request_field: fields.iter().map(|f| f.to_string()).collect(),
            },
        )
    }

    pub fn build_fetch_history(&self, chat_type: ChatType, msg_time: &str) -> Result<HttpRequest, ApiError> {
        self.post(
            GET_HISTORY,
            &GetHistory {
                chat_type,
                msg_time: msg_time.to_string(),
            },
        )
    }

    pub fn build_fetch_ip_list(&self) -> Result<HttpRequest, ApiError> {
        self.post(GET_IP_LIST, &GetIpList::default())
    }

    /// Uniform response contract shared by every operation.
    ///
    /// Non-2xx fails with `ApiError::TimServer`; a 2xx body is decoded as-is.
    /// The envelope's own `ErrorCode` is left for the caller.
    pub fn parse_envelope(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::TimServer {
        status: response.status,
        body: response.body.clone(),
    })
}
