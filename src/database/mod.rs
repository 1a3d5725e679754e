//! Database subsystem for flatdb
//!
//! A database is a directory under the configured databases root; its
//! tables live inside it. Selecting a database yields a [`Session`] that
//! callers pass into every table operation.

mod manager;
mod session;

pub use manager::{DatabaseManager, DIR_MODE};
pub use session::Session;
