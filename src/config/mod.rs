mod app;
mod database;

pub use app::{AppConfig, ClientConfig};
pub use database::{DatabaseConfig, Driver};
