//! Request handlers for the user directory.

mod users;

pub use users::*;
