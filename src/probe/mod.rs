mod basic;
mod client;
mod executor;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use executor::{ProbeResult, run_probe};
