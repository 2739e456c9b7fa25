//! Blocking client core for the instant-messaging platform's admin REST API.
//!
//! # Overview
//! Builds signed `HttpRequest` values and parses `HttpResponse` values
//! (host-does-IO pattern). `TimApi` pairs the request builder with a blocking
//! `Transport` for callers that just want to make the call.
//!
//! # Design
//! - `TimClient` holds configuration and a `Signer`; it never caches a
//!   connection. Every `build_*` call signs afresh and draws a new nonce.
//! - Every operation is a POST with a JSON body. The uniform response contract
//!   lives in `TimClient::parse_envelope`: non-2xx is `ApiError::TimServer`,
//!   2xx bodies decode into an `Envelope` without inspecting `ErrorCode`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod sign;
pub mod transport;
pub mod types;

pub use api::TimApi;
pub use client::TimClient;
pub use config::TimConfig;
pub use connection::{Connection, ConnectionBuilder};
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse};
pub use sign::{Signer, TlsSigV2};
pub use transport::{Transport, UreqTransport};
pub use types::{ChatType, Envelope, ImportMsg, MsgBodyElement, ProfileItem};
