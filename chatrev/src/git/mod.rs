//! Git integration.
//!
//! A background `std::thread` owns every `git2::Repository` handle
//! (`worker`). It loads snapshots and applies the decisions that
//! [`store::GitStore`] forwards to it from the UI thread.
pub mod store;
pub mod types;
pub mod worker;
