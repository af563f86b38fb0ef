//! # Library Metadata Module
//!
//! Read-only access to the bibliographic store backing attachment
//! resolution.
//!
//! ## Overview
//!
//! This module provides:
//! - The [`MetadataLookup`] trait consumed by the resolution engine
//! - [`SqliteMetadataStore`], its SQLite implementation (one read-only
//!   connection per call, no pool)
//! - [`AttachmentRecord`], the row shape bulk sync iterates

pub mod error;
pub mod models;
pub mod store;

pub use error::{LibraryError, Result};
pub use models::AttachmentRecord;
pub use store::{MetadataLookup, SqliteMetadataStore};
