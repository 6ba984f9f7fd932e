// Network adapter: the public WebSocket endpoint.

pub mod client;

pub use client::ws_handler;
