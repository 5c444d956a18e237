//! chatrev-core: cross-file review navigation and accept/reject workflow for
//! agent-proposed edits.
//!
//! The core knows nothing about any particular editor. Hosts provide:
//!
//! - a [`SessionRegistry`](session::SessionRegistry) of live sessions
//!   ([`text::TextSession`] is a ready-made one),
//! - an [`EditorHost`](editor::EditorHost) that opens documents and exposes the
//!   focused editor's [`HunkNavigator`](editor::HunkNavigator),
//! - the focused [`EditorSurface`](types::EditorSurface) at command time.
//!
//! [`commands::CommandDispatcher`] is the single entry point a host needs.

pub mod bulk;
pub mod commands;
pub mod editor;
pub mod error;
pub mod navigate;
pub mod resolve;
pub mod session;
pub mod text;
pub mod types;
pub mod workflow;

pub use commands::{CommandContext, CommandDispatcher, CommandOutcome, Invocation, ReviewCommand};
pub use error::{Result, ReviewError};
pub use types::{DiffInfo, Direction, DocumentId, EditorSurface, Hunk, HunkRef, Position};
