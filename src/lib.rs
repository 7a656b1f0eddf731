//! # Octosend Client
//! Asynchronous wrapper around the Octosend email dispatch HTTP API, providing typed handles for domains, spoolers, messages, and mail batches from Rust using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust developers driving email campaigns or transactional streams through Octosend: authenticate (or attach an API key), list resources lazily through [`Filter`] streams, prepare message content, and spool mails individually or in batches.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`, so ensure the chosen Tokio features (`rt-multi-thread` or `current_thread`) are available in your application.
//!
//! ## Out of scope
//! Not an SMTP client or mail renderer. It only proxies the Octosend service and inherits its quotas, scheduling, and delivery semantics. No retries or token refresh: a failed call surfaces immediately.
//!
//! ## Errors
//! All network calls surface transport failures as [`Error::Request`] and non-2xx statuses as [`Error::Api`] (status, headers, and body preserved); malformed replies become [`Error::Json`] or [`Error::ResponseParse`]. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use futures::TryStreamExt;
//! use octosend_client::{Client, IterateOptions, SpoolerType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), octosend_client::Error> {
//!     let mut client = Client::builder().build()?;
//!     client.authenticate("user@example.com", "secret").await?;
//!
//!     let filter = client.domains();
//!     println!("{} domains", filter.count().await?);
//!     let mut domains = std::pin::pin!(filter.iterate(IterateOptions::new()));
//!     while let Some(domain) = domains.try_next().await? {
//!         println!("{}", domain.name());
//!     }
//!
//!     let domain = client.domain("news.example.com").await?;
//!     let spooler = domain.create_spooler(SpoolerType::Marketing).await?;
//!     let mut batch = spooler.batch();
//!     batch.mail("alice@example.com");
//!     batch.spool().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod domain;
mod error;
mod filter;
mod mail;
mod message;
mod spooler;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL};
pub use domain::{Domain, DomainRecord};
pub use error::Error;
pub use filter::{DEFAULT_BATCH_SIZE, DEFAULT_FETCH_LIMIT, Filter, IterateOptions};
pub use mail::{SpoolerBatch, SpoolerMail};
pub use message::{MailMessage, SpoolerMessage};
pub use spooler::{Spooler, SpoolerRecord, SpoolerType};

/// Result type alias for Octosend operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
