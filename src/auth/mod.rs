//! Credential management.
//!
//! Platform credentials are opaque cookie header values kept in memory per
//! platform. They are replaced at runtime by administrative callers and
//! snapshotted by the gateway once per resolution.

mod store;

pub use store::{Credential, CredentialStore};
