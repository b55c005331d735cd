//! Mail provider (Lob) adapter.

mod client;
mod types;

pub use client::LobClient;
