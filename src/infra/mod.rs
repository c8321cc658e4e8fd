//! Infrastructure layer providing abstractions for external dependencies.
//!
//! This module contains traits and implementations for:
//! - DNS resolution
//! - History persistence (PostgreSQL, or in-process)
//!
//! Handlers depend on the traits only; concrete implementations are chosen
//! at startup and injected through the application state.

pub mod dns;
pub mod memory_store;
pub mod store;

pub use dns::{HickoryResolver, ResolutionError, Resolver};
pub use memory_store::MemoryHistoryStore;
pub use store::{HistoryRecord, HistoryStore, NewHistoryRecord, PgHistoryStore, StoreError};
