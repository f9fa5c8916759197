//! txhook Client SDK.
//!
//! This crate provides a client library for submitting transaction webhooks to
//! a txhook service and polling their status.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use txhook_client::{SubmitTransaction, TxhookClient};
//!
//! # async fn example() -> Result<(), txhook_client::ClientError> {
//! let client = TxhookClient::new("http://txhook:8080")?;
//!
//! client
//!     .submit_transaction(&SubmitTransaction::new("tx_123").currency("USD"))
//!     .await?;
//!
//! let record = client
//!     .wait_until_processed("tx_123", Duration::from_secs(1), Duration::from_secs(60))
//!     .await?;
//! println!("processed at {:?}", record.processed_at);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, TxhookClient};
pub use error::ClientError;
pub use types::*;
