pub mod app;
pub mod bootstrap;
pub mod config;
pub mod docs;
pub mod entity;
pub mod integrations;
pub mod routes;
pub mod state;
