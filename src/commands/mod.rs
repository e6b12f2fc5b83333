//! Command boundary
//!
//! Functions a front-end calls, organized by domain:
//! - File operations (list, info, rename, create, open, batch delete/copy/move/rename)
//! - System utilities (disks, shell passthrough, prompt)
//!
//! Arguments are plain strings and results are serializable; errors are
//! returned as display messages.

mod files;
mod system;

pub use files::*;
pub use system::*;
