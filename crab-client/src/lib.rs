//! Crab Client - remote entity gateway
//!
//! The simulator talks to the system of record only through
//! [`RemoteEntityGateway`]: create / read / update / delete keyed by
//! [`EntityType`]. Two implementations are provided:
//!
//! - [`HttpGateway`]: authenticated REST calls via reqwest
//! - [`MemoryGateway`]: in-process store with failure injection (dry runs, tests)

pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;

pub use cache::{MemoryCache, ResponseCache};
pub use config::ClientConfig;
pub use entity::{EntityType, Filter, ListQuery, Record};
pub use error::{GatewayError, GatewayResult};
pub use gateway::{RemoteEntityGateway, to_payload};
pub use http::HttpGateway;
pub use memory::{FailureKind, MemoryGateway, Operation};
