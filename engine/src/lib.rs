//! # Roster Engine
//!
//! A thread-safe in-memory entity store with filtered, sorted and paginated
//! retrieval.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine never touches files or the network
//! - **Deterministic queries**: results come back in a total order, ties
//!   broken by identity
//! - **Absence is not an error**: lookups return `Option`, mutations `bool`
//! - **Shared by reference**: every operation takes `&self`; wrap the store
//!   in an `Arc` to share it between threads
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! An [`EntityStore`] owns [`Record`]s. Each record has:
//! - A store-assigned identity, allocated monotonically and never reused
//! - A version number, bumped on every update
//! - Creation and update timestamps
//! - A typed payload
//!
//! ### Queries
//!
//! Payloads implement [`Entity`] to expose fields by name. Queries combine:
//! - [`Filter`] - a conjunction of optional constraints
//! - [`SortKey`] - a field name plus direction
//! - [`PageRequest`] - a validated `(index, size)` pair
//!
//! and return a [`Page`] with the matching slice and aggregate counts.
//!
//! ## Quick Start
//!
//! ```rust
//! use roster_engine::{EntityStore, Filter, PageRequest, Role, SortKey, User};
//!
//! let store = EntityStore::new();
//! store.create(User::new("Bob", "bob@example.com", Role::Editor));
//! store.create(User::new("Alice", "alice@example.com", Role::Admin));
//!
//! let page = store.paginate(
//!     &Filter::new(),
//!     &SortKey::by("name"),
//!     PageRequest::new(0, 10).unwrap(),
//! );
//! assert_eq!(page.items[0].payload().name, "Alice");
//! assert_eq!(page.total_pages, 1);
//!
//! assert!(store.update(1, |user| user.role = Role::Admin));
//! assert!(!store.update(99, |user| user.role = Role::Admin));
//! ```
//!
//! ## Persistence
//!
//! Use [`EntityStore::export_snapshot`] and [`EntityStore::import_snapshot`]
//! with [`StoreSnapshot`] to move state in and out as JSON.

pub mod clock;
pub mod error;
pub mod git;
pub mod query;
pub mod record;
pub mod repository;
pub mod snapshot;
pub mod store;
pub mod task;
pub mod user;

// Re-export main types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::Error;
pub use git::{Executable, GitError, GitOperation};
pub use query::{
    Constraint, Entity, FieldValue, Filter, Page, PageRequest, SortKey, SortOrder, SortTarget,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use record::{Metadata, Record};
pub use repository::{format_size, RepoStatus, Repository};
pub use snapshot::{StoreSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::EntityStore;
pub use task::{Priority, Task, TaskStats, TaskStatus};
pub use user::{Permission, Role, User};

/// Type aliases for clarity
pub type RecordId = u64;
pub type Version = u64;
pub type Timestamp = u64;
