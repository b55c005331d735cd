//! Postcard Hub — a small web backend that lets community members register
//! mailing addresses and send each other postcards, physical or digital,
//! through an external mail provider. Physical sends draw down a per-member
//! credit balance that is topped up by a payment provider webhook.
//!
//! Layout follows ports-and-adapters: `domain` holds the core types and the
//! webhook verifier, `ports` the trait seams for external systems, and
//! `adapters` the concrete HTTP handlers, provider clients, and the
//! Postgres store.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
