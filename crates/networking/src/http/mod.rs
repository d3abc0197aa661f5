//! Raw HTTP layer

mod client;

pub use client::FabulaClient;
