//! SQLite database management

mod connection;
mod messages;
mod profiles;

pub use connection::Database;
pub use messages::*;
pub use profiles::*;
