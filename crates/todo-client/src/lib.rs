//! Client library for the TodoApp API.
//!
//! Layers, bottom to top: [`session`] persists the token pair,
//! [`client`] speaks the wire protocol with automatic refresh-and-retry,
//! [`dashboard`] mirrors server state, and [`filter`] derives views and
//! counters without touching the network.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod session;
pub mod types;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use dashboard::{BulkOutcome, Dashboard};
pub use error::{ApiError, Result};
pub use filter::{apply, stats, CategoryFilter, DueFilter, Filters, Stats, StatusFilter};
pub use session::{SessionStore, TokenPair};
pub use types::{Category, CategoryPayload, Priority, Todo, TodoPayload, UserInfo};
