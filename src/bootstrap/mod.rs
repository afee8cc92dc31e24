mod env;
mod server;
mod tracing;

pub use server::{Layers, app, assemble, bind_listener, init_server, router};

pub async fn init_base() {
    let loaded = env::init_env().await;
    tracing::init_tracing().await;
    env::report(&loaded);
}
