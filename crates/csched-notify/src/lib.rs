//! Delivery of run outcomes to an external HTTP sink.
//!
//! [`HttpNotifier`] posts a [`csched_model::Payload`] as JSON and retries with a fixed interval
//! until a 2xx response arrives or the retry budget is spent.

mod config;
pub use config::NotifyConfig;

mod error;
pub use error::NotifyError;

mod http;
pub use http::HttpNotifier;

mod notify;
pub use notify::Notify;
