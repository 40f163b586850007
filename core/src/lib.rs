//! Synchronous API client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). Every REST endpoint the
//! service exposes has a `build_*` / `parse_*` pair on `TodoClient`.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - DTOs are defined independently from the server crate; the integration
//!   test catches schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{DeleteSummary, Priority, PriorityStats, TodoInput, TodoItem};
