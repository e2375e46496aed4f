//! Storage and environment plumbing around the matching core.
//!
//! This crate provides:
//! - Environment lookups for home, store and config paths.
//! - The async [`MatchingStore`] trait with in-memory and JSON-file backends.
//! - The [`Notifier`] trait used to surface new recommendations and alerts.

pub mod env;
pub mod error;
pub mod notify;
pub mod records;
pub mod store;

pub use env::{config_path, default_store_path, env_diag, helpix_dir, home_dir, store_path_from_env};
pub use error::{StoreError, StoreResult};
pub use notify::{LogNotifier, MemNotifier, Notification, Notifier};
pub use records::{HistoryEntry, RecommendationAction, HISTORY_LIMIT};
pub use store::{JsonFileStore, MatchingStore, MemStore, StoreData};
