//! Core components for federated credential exchange and request signing.
//!
//! This crate provides the foundational types and traits for the fedsign
//! ecosystem. It defines the capability context the higher layers run
//! against, the error taxonomy they report through, and the signing
//! primitives they share.
//!
//! ## Overview
//!
//! The crate is built around a few key concepts:
//!
//! - **Context**: a container holding implementations for HTTP sending and
//!   key/value storage. fedsign provides NO default implementations; any
//!   unconfigured capability returns an error when called.
//! - **Traits**: abstract interfaces for credential loading
//!   ([`ProvideCredential`]) and credential validation
//!   ([`SigningCredential`]).
//! - **SigningRequest**: a normalized, signable view of an outgoing HTTP
//!   request, built from [`http::request::Parts`] plus the body bytes and
//!   applied back once signed.
//!
//! ## Utilities
//!
//! - [`hash`]: SHA-256 and HMAC-SHA256 helpers used by signature derivation
//! - [`time`]: the signing timestamp formats (`yyyymmdd`, compressed ISO 8601)
//! - [`utils`]: secret redaction for `Debug` output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod api;
pub use api::{ProvideCredential, SigningCredential};
mod context;
pub use context::{Context, HttpSend, KvStore, NoopHttpSend, NoopKvStore};
mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
pub use request::SigningRequest;
