//! # Attachment Resolution Module
//!
//! Resolves bibliographic attachment references to local files, fetching
//! from the remote library mirror on local misses.
//!
//! ## Components
//!
//! - **Reference parsing** (`reference`): normalises `storage:` /
//!   `attachments:` / legacy-path notations
//! - **Local locator** (`locator`): recursive filename search of the library
//! - **Resolution cache** (`cache`): bounded LRU of resolved locations
//! - **Remote seam** (`remote`): trait the WebDAV provider implements
//! - **Sync reports** (`job`): per-invocation bulk sync summaries
//! - **Engine** (`engine`): the `resolve` / `sync_all` orchestration with
//!   per-key single-flight

pub mod cache;
pub mod engine;
pub mod error;
pub mod job;
pub mod locator;
pub mod reference;
pub mod remote;
pub mod resolved;

pub use cache::{CacheEntry, ResolutionCache};
pub use engine::{EngineConfig, ResolutionEngine};
pub use error::{ResolverError, Result};
pub use job::{RemoteStatus, SyncJobId, SyncKind, SyncOutcome, SyncReport};
pub use locator::{AttachmentLocator, FsLocator};
pub use reference::{AttachmentReference, Notation};
pub use remote::{RemoteError, RemoteSyncClient};
pub use resolved::{ResolutionSource, ResolvedFile};
