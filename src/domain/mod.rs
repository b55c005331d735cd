//! Domain types: members, postcards, and payment webhook processing.

pub mod payment;
pub mod postcard;
pub mod user;
