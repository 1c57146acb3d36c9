//! Shared domain model and synchronous API client for the property service.
//!
//! # Overview
//! `types` defines the property record and request payloads used by both the
//! server and its clients. `PropertyClient` builds `HttpRequest` values and
//! parses `HttpResponse` values without touching the network (host-does-IO
//! pattern), so it stays deterministic and testable.
//!
//! # Design
//! - `PropertyClient` is stateless: it holds only `base_url`.
//! - Each endpoint is split into `build_*` (produces a request) and
//!   `parse_*` (consumes a response), so the I/O boundary is explicit.
//! - Types use owned `String` / `Vec` fields throughout.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::PropertyClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{Cost, MessageBody, Property, PropertyFields, UpdateGroup};
