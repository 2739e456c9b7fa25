use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, Db, ERR_BAD_PARAMS, ERR_BAD_USERSIG, ERR_NO_ACCOUNT};
use serde_json::Value;
use tower::ServiceExt;

const CREDS: &str = "sdkappid=1400000000&identifier=admin&usersig=sig&random=42&contenttype=json";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn post(path: &str, query: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(format!("{path}?{query}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn signed(path: &str, body: &str) -> Request<String> {
    post(path, CREDS, body)
}

// --- credentials ---

#[tokio::test]
async fn missing_credentials_fail_in_envelope() {
    let resp = app()
        .oneshot(post("/v4/ConfigSvc/GetIPList", "contenttype=json", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ActionStatus"], "FAIL");
    assert_eq!(body["ErrorCode"], ERR_BAD_PARAMS);
}

#[tokio::test]
async fn empty_usersig_is_rejected() {
    let query = "sdkappid=1&identifier=admin&usersig=&random=1&contenttype=json";
    let resp = app()
        .oneshot(post("/v4/ConfigSvc/GetIPList", query, "{}"))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["ErrorCode"], ERR_BAD_USERSIG);
}

#[tokio::test]
async fn forced_status_short_circuits() {
    let db = Db::default();
    db.write().await.force_status = Some(500);
    let resp = app_with_state(db)
        .oneshot(signed("/v4/ConfigSvc/GetIPList", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_bytes(resp).await.is_empty());
}

// --- accounts ---

#[tokio::test]
async fn ip_list_returns_addresses() {
    let resp = app()
        .oneshot(signed("/v4/ConfigSvc/GetIPList", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ActionStatus"], "OK");
    assert!(body["IPList"].as_array().is_some_and(|l| !l.is_empty()));
}

#[tokio::test]
async fn kick_unknown_account_fails() {
    let resp = app()
        .oneshot(signed("/v4/im_open_login_svc/kick", r#"{"Identifier":"ghost"}"#))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["ErrorCode"], ERR_NO_ACCOUNT);
}

#[tokio::test]
async fn malformed_body_returns_422() {
    let resp = app()
        .oneshot(signed("/v4/im_open_login_svc/account_import", r#"{"Nick":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn history_rejects_bad_msg_time() {
    let resp = app()
        .oneshot(signed(
            "/v4/open_msg_svc/get_history",
            r#"{"ChatType":"C2C","MsgTime":"yesterday"}"#,
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["ActionStatus"], "FAIL");
}

// --- full account lifecycle ---

#[tokio::test]
async fn account_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // import
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(signed(
            "/v4/im_open_login_svc/account_import",
            r#"{"Identifier":"u1","Nick":"Alice"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["ErrorCode"], 0);

    // check: u1 imported, u2 not
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(signed(
            "/v4/im_open_login_svc/account_check",
            r#"{"CheckItem":[{"UserID":"u1"},{"UserID":"u2"}]}"#,
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["ResultItem"][0]["AccountStatus"], "Imported");
    assert_eq!(body["ResultItem"][1]["AccountStatus"], "NotImported");

    // set and read back a profile field
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(signed(
            "/v4/profile/portrait_set",
            r#"{"From_Account":"u1","ProfileItem":[{"Tag":"Tag_Profile_IM_Nick","Value":"Bob"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["ErrorCode"], 0);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(signed(
            "/v4/profile/portrait_get",
            r#"{"To_Account":["u1"],"TagList":["Tag_Profile_IM_Nick"]}"#,
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["UserProfileItem"][0]["ProfileItem"][0]["Value"], "Bob");

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(signed(
            "/v4/im_open_login_svc/account_delete",
            r#"{"DeleteItem":[{"UserID":"u1"}]}"#,
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["ResultItem"][0]["ResultCode"], 0);

    // check after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(signed(
            "/v4/im_open_login_svc/account_check",
            r#"{"CheckItem":[{"UserID":"u1"}]}"#,
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["ResultItem"][0]["AccountStatus"], "NotImported");
}
