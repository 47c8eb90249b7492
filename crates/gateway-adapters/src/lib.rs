//! postbox/crates/gateway-adapters/src/lib.rs
//!
//! Implementations of the `BoardGateway` port: the GraphQL-over-HTTP
//! production adapter and an in-memory fake for tests and offline runs.

pub mod graphql;
pub mod memory;

pub use graphql::GraphqlGateway;
pub use memory::{CallCounts, GatewayOp, MemoryGateway};
