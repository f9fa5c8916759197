//! txhook HTTP API service.
//!
//! This crate provides the HTTP surface and the asynchronous core of txhook:
//!
//! - Idempotent transaction webhook ingestion
//! - Delayed completion of admitted transactions
//! - Transaction status lookups
//!
//! # Lifecycle
//!
//! A webhook admits a transaction in `PROCESSING` through the store's atomic
//! insert. The first submission for an id spawns one completion worker, which
//! marks the transaction `PROCESSED` after the configured delay. Duplicates
//! change nothing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for routing

pub mod config;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod routes;
pub mod state;
pub mod status;
pub mod worker;

pub use config::{ServiceConfig, StorageBackend};
pub use error::ApiError;
pub use ingest::{Ingestor, Submission, TransactionPayload};
pub use routes::create_router;
pub use state::AppState;
pub use worker::{CompletionWorkers, DrainReport};
