//! Mock API Server
//!
//! Serves synthetic JSON responses for user-defined projects of HTTP
//! endpoints. Each endpoint carries a schema template whose string leaves
//! may be directives such as `(random:uuid)`; every request generates fresh
//! values for them.
//!
//! # Features
//!
//! - **Path Matching**: Static segments and `:param` segments, with
//!   single-item routes tried before collection routes
//! - **Schema Directives**: UUIDs, names, emails, numbers, dates, text and more
//! - **Response Shapes**: Lists (`{ "data": [...] }`, optionally paginated)
//!   or single objects echoing their path parameters
//! - **API Keys**: Per-endpoint and per-project keys
//! - **Latency Simulation**: Fixed per-endpoint delays
//!
//! # Example Configuration
//!
//! ```yaml
//! projects:
//!   - id: shop
//!     endpoints:
//!       - path: /items
//!         method: GET
//!         response_type: list
//!         count: 3
//!         schema_definition:
//!           id: "(random:uuid)"
//!           label: fixed
//! ```
//!
//! `GET /mock/shop/items` then returns three items with distinct ids.

pub mod assembler;
pub mod config;
pub mod directive;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod faker;
pub mod generator;
pub mod matcher;
pub mod schema;
pub mod server;
pub mod store;

pub use config::MockServerConfig;
pub use engine::MockEngine;
