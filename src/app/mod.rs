pub mod controller;
pub mod extract;
pub mod middleware;
pub mod model;
pub mod response;
