//! Units the server is assembled from. Each one is built on its own and can
//! fail on its own; `bootstrap::server` wires them together.

pub mod cors;
pub mod database;
pub mod http_client;
pub mod qrcode;
pub mod ws;
