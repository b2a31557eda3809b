//! Infrastructure layer
//!
//! Concrete adapters for the ports defined under `domain::ports`:
//! configuration loading, logging setup, the subprocess-based installer
//! launcher, a session client backed by a statically configured provider
//! list, and default (out-of-scope-but-necessary) pattern-executor/language-
//! model bindings.

pub mod config;
pub mod executor;
pub mod logging;
pub mod process;
pub mod registry_client;
pub mod session;
