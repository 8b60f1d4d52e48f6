//! WebSocket module for the order-update feed

mod client;
mod manager;

pub use client::{FeedClient, Incoming};
pub use manager::FeedManager;
