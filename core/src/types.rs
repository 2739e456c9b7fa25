//! Request bodies and the response envelope for the admin API.
//!
//! # Design
//! Each operation owns a body type whose serde names match the wire keys
//! exactly. Account identifiers are stored as `String`; constructors accept
//! anything `ToString` so numeric ids serialize as strings. Optional fields
//! are dropped from the JSON when absent or empty, never sent as `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn to_strings<I: ToString>(ids: &[I]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AccountImport {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_url: Option<String>,
}

impl AccountImport {
    pub fn new(identifier: impl ToString, nick: Option<&str>, face_url: Option<&str>) -> Self {
        Self {
            identifier: identifier.to_string(),
            nick: non_empty(nick),
            face_url: non_empty(face_url),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MultiAccountImport {
    pub accounts: Vec<String>,
}

impl MultiAccountImport {
    pub fn new<I: ToString>(accounts: &[I]) -> Self {
        Self {
            accounts: to_strings(accounts),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserItem {
    #[serde(rename = "UserID")]
    pub user_id: String,
}

fn user_items<I: ToString>(accounts: &[I]) -> Vec<UserItem> {
    accounts
        .iter()
        .map(|a| UserItem {
            user_id: a.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AccountDelete {
    pub delete_item: Vec<UserItem>,
}

impl AccountDelete {
    pub fn new<I: ToString>(accounts: &[I]) -> Self {
        Self {
            delete_item: user_items(accounts),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AccountCheck {
    pub check_item: Vec<UserItem>,
}

impl AccountCheck {
    pub fn new<I: ToString>(accounts: &[I]) -> Self {
        Self {
            check_item: user_items(accounts),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Kick {
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryState {
    #[serde(rename = "To_Account")]
    pub to_account: Vec<String>,
    #[serde(rename = "IsNeedDetail")]
    pub is_need_detail: u8,
}

impl QueryState {
    pub fn new<I: ToString>(accounts: &[I], need_detail: bool) -> Self {
        Self {
            to_account: to_strings(accounts),
            is_need_detail: u8::from(need_detail),
        }
    }
}

/// One element of a message body, e.g. `TIMTextElem`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MsgBodyElement {
    pub msg_type: String,
    pub msg_content: Value,
}

impl MsgBodyElement {
    pub fn text(text: &str) -> Self {
        Self {
            msg_type: "TIMTextElem".to_string(),
            msg_content: serde_json::json!({ "Text": text }),
        }
    }

    pub fn custom(data: &str, desc: &str) -> Self {
        Self {
            msg_type: "TIMCustomElem".to_string(),
            msg_content: serde_json::json!({ "Data": data, "Desc": desc }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportMsg {
    /// 1: imported as a new message (counts as unread); 2: history only.
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
    pub msg_body: Vec<MsgBodyElement>,
}

impl ImportMsg {
    pub fn new(
        from_account: impl ToString,
        to_account: impl ToString,
        msg_random: u32,
        msg_timestamp: u64,
        msg_body: Vec<MsgBodyElement>,
    ) -> Self {
        Self {
            sync_from_old_system: 1,
            from_account: from_account.to_string(),
            to_account: to_account.to_string(),
            msg_random,
            msg_timestamp,
            msg_body,
        }
    }

    /// Import as history only, without counting toward unread.
    pub fn history_only(mut self) -> Self {
        self.sync_from_old_system = 2;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MsgWithdraw {
    #[serde(rename = "From_Account")]
    pub from_account: String,
    #[serde(rename = "To_Account")]
    pub to_account: String,
    #[serde(rename = "MsgKey")]
    pub msg_key: String,
}

/// A profile field, e.g. `Tag_Profile_IM_Nick`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ProfileItem {
    pub tag: String,
    pub value: Value,
}

impl ProfileItem {
    pub fn new(tag: &str, value: impl Into<Value>) -> Self {
        Self {
            tag: tag.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortraitSet {
    #[serde(rename = "From_Account")]
    pub from_account: String,
    #[serde(rename = "ProfileItem")]
    pub profile_item: Vec<ProfileItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortraitGet {
    #[serde(rename = "To_Account")]
    pub to_account: Vec<String>,
    #[serde(rename = "TagList")]
    pub tag_list: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GetAppInfo {
    pub request_field: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChatType {
    C2C,
    Group,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GetHistory {
    pub chat_type: ChatType,
    /// Hour bucket formatted `YYYYMMDDHH`.
    pub msg_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GetIpList {}

/// Decoded response body, kept verbatim.
///
/// The status accessors read the well-known keys leniently and nothing here
/// is checked automatically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Envelope(pub Map<String, Value>);

impl Envelope {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn action_status(&self) -> Option<&str> {
        self.get("ActionStatus").and_then(Value::as_str)
    }

    /// `ErrorCode` as an integer; numeric strings are accepted too.
    pub fn error_code(&self) -> Option<i64> {
        match self.get("ErrorCode")? {
            Value::String(code) => code.trim().parse().ok(),
            other => other.as_i64(),
        }
    }

    pub fn error_info(&self) -> Option<&str> {
        self.get("ErrorInfo").and_then(Value::as_str)
    }

    pub fn is_ok(&self) -> bool {
        self.error_code().unwrap_or(0) == 0 && self.action_status() != Some("FAIL")
    }

    /// Turn an application-level failure into `ApiError::Service`.
    pub fn into_result(self) -> Result<Self, ApiError> {
        if self.is_ok() {
            return Ok(self);
        }
        Err(ApiError::Service {
            code: self.error_code().unwrap_or(-1),
            info: self.error_info().unwrap_or_default().to_string(),
        })
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
