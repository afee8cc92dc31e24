pub mod auth;
pub mod config;
pub mod controller;
pub mod response;
