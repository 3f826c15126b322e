//! Authenticated actions against a Bluesky / AT Protocol personal data server.
//!
//! Every action takes the caller's [`Session`] explicitly and reports failure
//! as one of the two [`ActionError`] kinds, whatever went wrong underneath.

pub mod api;
mod client;
pub mod error;
pub mod logging;
mod traffic_log;
pub mod transport;
pub mod uri;

pub use api::*;
pub use client::{
    ActionClient, ActionResult, CREATE_RECORD, DELETE_RECORD, GET_TIMELINE, SET_VOTE,
    TIMELINE_CURSOR_PARAM, UPLOAD_BLOB,
};
pub use error::{ActionError, classify};
pub use transport::{
    HttpTransport, RequestBody, Transport, TransportFailure, TransportResult, XrpcMethod,
    XrpcRequest,
};
pub use uri::{AtUri, MalformedUri, record_key};
