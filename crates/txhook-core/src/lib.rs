//! Core types for txhook.
//!
//! This crate provides the domain model shared by the store and the service:
//!
//! - **Identifiers**: `TransactionId`, the externally supplied dedup key
//! - **Transactions**: `Transaction`, `NewTransaction`, `TransactionStatus`
//! - **Errors**: `IdError`, `TransitionError`
//!
//! # Lifecycle
//!
//! A transaction is admitted once in `PROCESSING` and completed once into
//! `PROCESSED`. There is no other transition.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod transaction;

pub use error::{IdError, TransitionError};
pub use ids::TransactionId;
pub use transaction::{NewTransaction, Transaction, TransactionStatus};
