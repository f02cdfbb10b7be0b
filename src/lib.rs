//! Diagnostic harness for the undocumented live-bus API's client
//! authentication scheme.
//!
//! The token the official web client sends is an MD5 digest of the raw
//! request parameters with timestamp fragments spliced in. Which parameter
//! ordering and optional fields the server actually accepts is unconfirmed,
//! so this crate derives candidate tokens and drives a fixed matrix of
//! named variants against the live service, recording every outcome for
//! manual comparison.

pub mod canonical;
pub mod config;
pub mod matrix;
pub mod probe;
pub mod report;
pub mod response;
pub mod token;
