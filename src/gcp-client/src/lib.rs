//! Google Cloud Monitoring, Logging and Trace REST sources.
//!
//! [`GcpClient`] authenticates with a service account key, an
//! `authorized_user` refresh token or a static access token, and implements
//! the source traits of `common::source` on top of the v3 Monitoring,
//! v2 Logging and v1 Trace APIs.

pub mod client;
pub mod credentials;
pub mod logs;
pub mod metrics;
pub mod pager;
pub mod traces;

#[cfg(feature = "testing")]
pub mod testing;

pub use client::GcpClient;
pub use credentials::Credentials;
