//! # WebDAV Provider
//!
//! Implements the `RemoteSyncClient` trait for a WebDAV remote mirror.
//!
//! ## Overview
//!
//! This module provides:
//! - Basic-auth WebDAV access with rate limiting and exponential backoff
//! - Per-key attachment downloads into the local library layout
//! - Atomic replacement of the local database snapshot
//! - Existence probes and connectivity tests via PROPFIND

pub mod client;
pub mod error;
pub mod transport;

pub use client::WebDavClient;
pub use error::{Result, WebDavError};
pub use transport::{HttpTransport, ReqwestTransport};
