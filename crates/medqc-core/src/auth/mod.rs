//! Authentication state for the current client session.
//!
//! This module provides:
//! - `SessionStorage`: key/value backend scoped to one session (one "tab")
//! - `MemoryStorage`: the in-process backend used by the shell and tests
//! - `SessionStore`: token + user info on top of a storage backend
//!
//! Nothing here is persisted across processes; a new shell starts logged out.

pub mod session;
pub mod storage;

pub use session::{SessionStore, UserInfo, TOKEN_KEY, USER_KEY};
pub use storage::{MemoryStorage, SessionStorage, StorageError, UnavailableStorage};
