//! In-memory stand-in for the admin REST API, used by integration tests.
//!
//! Every route is a POST that checks the credential query parameters and
//! answers with the usual `ActionStatus` / `ErrorCode` / `ErrorInfo` envelope.
//! `MockState::force_status` makes every route fail with a bare HTTP status.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const ERR_BAD_PARAMS: i64 = 60002;
pub const ERR_BAD_USERSIG: i64 = 70003;
pub const ERR_NO_ACCOUNT: i64 = 70107;
pub const ERR_NO_MESSAGE: i64 = 20022;
pub const ERR_BAD_MSG_TIME: i64 = 1004;

#[derive(Debug, Clone, Default)]
pub struct Account {
    pub nick: Option<String>,
    pub face_url: Option<String>,
    pub online: bool,
    pub profile: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct StoredMsg {
    pub from: String,
    pub to: String,
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub accounts: HashMap<String, Account>,
    pub messages: HashMap<String, StoredMsg>,
    pub next_seq: u64,
    pub force_status: Option<u16>,
}

pub type Db = Arc<RwLock<MockState>>;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub sdkappid: u64,
    pub identifier: String,
    pub usersig: String,
    pub random: u32,
    pub contenttype: String,
}

pub fn app() -> Router {
    app_with_state(Db::default())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/v4/im_open_login_svc/account_import", post(account_import))
        .route("/v4/im_open_login_svc/multiaccount_import", post(multi_account_import))
        .route("/v4/im_open_login_svc/account_delete", post(account_delete))
        .route("/v4/im_open_login_svc/account_check", post(account_check))
        .route("/v4/im_open_login_svc/kick", post(kick))
        .route("/v4/openim/querystate", post(query_state))
        .route("/v4/openim/importmsg", post(import_msg))
        .route("/v4/openim/admin_msgwithdraw", post(msg_withdraw))
        .route("/v4/profile/portrait_set", post(portrait_set))
        .route("/v4/profile/portrait_get", post(portrait_get))
        .route("/v4/openconfigsvr/getappinfo", post(get_app_info))
        .route("/v4/open_msg_svc/get_history", post(get_history))
        .route("/v4/ConfigSvc/GetIPList", post(get_ip_list))
        .layer(middleware::from_fn_with_state(db.clone(), guard))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, Db::default()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

fn ok(extra: Value) -> Json<Value> {
    let mut body = json!({ "ActionStatus": "OK", "ErrorCode": 0, "ErrorInfo": "" });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    Json(body)
}

fn fail(code: i64, info: &str) -> Json<Value> {
    Json(json!({ "ActionStatus": "FAIL", "ErrorCode": code, "ErrorInfo": info }))
}

async fn guard(
    State(db): State<Db>,
    query: Result<Query<Credentials>, QueryRejection>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(status) = db.read().await.force_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::warn!(%status, path = %req.uri().path(), "forced failure");
        return status.into_response();
    }
    let Ok(Query(creds)) = query else {
        return fail(ERR_BAD_PARAMS, "missing credential query parameters").into_response();
    };
    if creds.contenttype != "json" || creds.sdkappid == 0 || creds.identifier.is_empty() {
        return fail(ERR_BAD_PARAMS, "invalid credential query parameters").into_response();
    }
    if creds.usersig.is_empty() {
        return fail(ERR_BAD_USERSIG, "usersig is empty").into_response();
    }
    tracing::debug!(path = %req.uri().path(), random = creds.random, "admin call");
    next.run(req).await
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountImport {
    pub identifier: String,
    pub nick: Option<String>,
    pub face_url: Option<String>,
}

async fn account_import(State(db): State<Db>, Json(input): Json<AccountImport>) -> Json<Value> {
    let mut state = db.write().await;
    let account = state.accounts.entry(input.identifier).or_default();
    account.nick = input.nick;
    account.face_url = input.face_url;
    ok(json!({}))
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MultiAccountImport {
    pub accounts: Vec<String>,
}

async fn multi_account_import(State(db): State<Db>, Json(input): Json<MultiAccountImport>) -> Json<Value> {
    let mut state = db.write().await;
    for id in input.accounts {
        state.accounts.entry(id).or_default();
    }
    ok(json!({ "FailAccounts": [] }))
}

#[derive(Deserialize)]
pub struct UserItem {
    #[serde(rename = "UserID")]
    pub user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountDelete {
    pub delete_item: Vec<UserItem>,
}

async fn account_delete(State(db): State<Db>, Json(input): Json<AccountDelete>) -> Json<Value> {
    let mut state = db.write().await;
    let items: Vec<Value> = input
        .delete_item
        .into_iter()
        .map(|item| {
            let code = if state.accounts.remove(&item.user_id).is_some() { 0 } else { ERR_NO_ACCOUNT };
            json!({ "UserID": item.user_id, "ResultCode": code, "ResultInfo": "" })
        })
        .collect();
    ok(json!({ "ResultItem": items }))
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountCheck {
    pub check_item: Vec<UserItem>,
}

async fn account_check(State(db): State<Db>, Json(input): Json<AccountCheck>) -> Json<Value> {
    let state = db.read().await;
    let items: Vec<Value> = input
        .check_item
        .into_iter()
        .map(|item| {
            let status = if state.accounts.contains_key(&item.user_id) { "Imported" } else { "NotImported" };
            json!({ "UserID": item.user_id, "ResultCode": 0, "ResultInfo": "", "AccountStatus": status })
        })
        .collect();
    ok(json!({ "ResultItem": items }))
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Kick {
    pub identifier: String,
}

async fn kick(State(db): State<Db>, Json(input): Json<Kick>) -> Json<Value> {
    let mut state = db.write().await;
    match state.accounts.get_mut(&input.identifier) {
        Some(account) => {
            account.online = false;
            ok(json!({}))
        }
        None => fail(ERR_NO_ACCOUNT, "account not found"),
    }
}

#[derive(Deserialize)]
pub struct QueryState {
    #[serde(rename = "To_Account")]
    pub to_account: Vec<String>,
    #[serde(rename = "IsNeedDetail", default)]
    pub is_need_detail: u8,
}

async fn query_state(State(db): State<Db>, Json(input): Json<QueryState>) -> Json<Value> {
    let state = db.read().await;
    let mut results = Vec::new();
    let mut errors = Vec::new();
    for id in input.to_account {
        match state.accounts.get(&id) {
            Some(account) => {
                let status = if account.online { "Online" } else { "Offline" };
                let mut entry = json!({ "To_Account": id, "Status": status });
                if input.is_need_detail == 1 {
                    entry["Detail"] = json!([]);
                }
                results.push(entry);
            }
            None => errors.push(json!({ "To_Account": id, "ErrorCode": ERR_NO_ACCOUNT })),
        }
    }
    let mut body = json!({ "QueryResult": results });
    if !errors.is_empty() {
        body["ErrorList"] = json!(errors);
    }
    ok(body)
}

#[derive(Deserialize)]
pub struct ImportMsg {
    #[serde(rename = "SyncFromOldSystem")]
    pub sync_from_old_system: u8,
    #[serde(rename = "From_Account")]
    pub from_account: String,
    #[serde(rename = "To_Account")]
    pub to_account: String,
    #[serde(rename = "MsgRandom")]
    pub msg_random: u32,
    #[serde(rename = "MsgTimeStamp")]
    pub msg_timestamp: u64,
    #[serde(rename = "MsgBody")]
    pub msg_body: Value,
}

async fn import_msg(State(db): State<Db>, Json(input): Json<ImportMsg>) -> Json<Value> {
    let mut state = db.write().await;
    for id in [&input.from_account, &input.to_account] {
        if !state.accounts.contains_key(id) {
            return fail(ERR_NO_ACCOUNT, "account not found");
        }
    }
    state.next_seq += 1;
    let key = format!("{}_{}_{}", input.msg_random, state.next_seq, input.msg_timestamp);
    tracing::debug!(%key, sync = input.sync_from_old_system, "imported message");
    state.messages.insert(
        key.clone(),
        StoredMsg {
            from: input.from_account,
            to: input.to_account,
            body: input.msg_body,
        },
    );
    ok(json!({ "MsgKey": key }))
}

#[derive(Deserialize)]
pub struct MsgWithdraw {
    #[serde(rename = "From_Account")]
    pub from_account: String,
    #[serde(rename = "To_Account")]
    pub to_account: String,
    #[serde(rename = "MsgKey")]
    pub msg_key: String,
}

async fn msg_withdraw(State(db): State<Db>, Json(input): Json<MsgWithdraw>) -> Json<Value> {
    let mut state = db.write().await;
    let matches = state
        .messages
        .get(&input.msg_key)
        .is_some_and(|m| m.from == input.from_account && m.to == input.to_account);
    if !matches {
        return fail(ERR_NO_MESSAGE, "message not found");
    }
    state.messages.remove(&input.msg_key);
    ok(json!({}))
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProfileItem {
    pub tag: String,
    pub value: Value,
}

#[derive(Deserialize)]
pub struct PortraitSet {
    #[serde(rename = "From_Account")]
    pub from_account: String,
    #[serde(rename = "ProfileItem")]
    pub profile_item: Vec<ProfileItem>,
}

async fn portrait_set(State(db): State<Db>, Json(input): Json<PortraitSet>) -> Json<Value> {
    let mut state = db.write().await;
    let Some(account) = state.accounts.get_mut(&input.from_account) else {
        return fail(ERR_NO_ACCOUNT, "account not found");
    };
    for item in input.profile_item {
        account.profile.insert(item.tag, item.value);
    }
    ok(json!({}))
}

#[derive(Deserialize)]
pub struct PortraitGet {
    #[serde(rename = "To_Account")]
    pub to_account: Vec<String>,
    #[serde(rename = "TagList")]
    pub tag_list: Vec<String>,
}

async fn portrait_get(State(db): State<Db>, Json(input): Json<PortraitGet>) -> Json<Value> {
    let state = db.read().await;
    let items: Vec<Value> = input
        .to_account
        .into_iter()
        .map(|id| match state.accounts.get(&id) {
            Some(account) => {
                let profile: Vec<Value> = input
                    .tag_list
                    .iter()
                    .filter_map(|tag| {
                        let value = account.profile.get(tag)?;
                        Some(json!({ "Tag": tag, "Value": value }))
                    })
                    .collect();
                json!({ "To_Account": id, "ProfileItem": profile, "ResultCode": 0, "ResultInfo": "" })
            }
            None => json!({ "To_Account": id, "ProfileItem": [], "ResultCode": ERR_NO_ACCOUNT, "ResultInfo": "account not found" }),
        })
        .collect();
    ok(json!({ "UserProfileItem": items }))
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetAppInfo {
    #[serde(default)]
    pub request_field: Vec<String>,
}

async fn get_app_info(State(db): State<Db>, Json(input): Json<GetAppInfo>) -> Json<Value> {
    let state = db.read().await;
    let online = state.accounts.values().filter(|a| a.online).count();
    let all = BTreeMap::from([
        ("ActiveUserNum", online.to_string()),
        ("RegistUserNumTotal", state.accounts.len().to_string()),
        ("C2CUpMsgNum", state.next_seq.to_string()),
        ("LoginUserNum", online.to_string()),
    ]);
    let fields: serde_json::Map<String, Value> = all
        .into_iter()
        .filter(|(k, _)| input.request_field.is_empty() || input.request_field.iter().any(|f| f == k))
        .map(|(k, v)| (k.to_string(), Value::String(v)))
        .collect();
    ok(json!({ "Result": [fields] }))
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetHistory {
    pub chat_type: String,
    pub msg_time: String,
}

async fn get_history(Json(input): Json<GetHistory>) -> Json<Value> {
    let valid_type = matches!(input.chat_type.as_str(), "C2C" | "Group");
    let valid_time = input.msg_time.len() == 10 && input.msg_time.chars().all(|c| c.is_ascii_digit());
    if !valid_type || !valid_time {
        return fail(ERR_BAD_MSG_TIME, "invalid ChatType or MsgTime");
    }
    ok(json!({
        "File": [{
            "URL": format!("https://download.invalid/{}/{}.gz", input.chat_type, input.msg_time),
            "ExpireTime": "",
            "FileSize": 0,
            "FileMD5": "",
            "GzipSize": 0,
            "GzipMD5": ""
        }]
    }))
}

async fn get_ip_list(Json(_input): Json<Value>) -> Json<Value> {
    ok(json!({ "IPList": ["127.0.0.1"] }))
}
