use std::sync::Arc;

use crate::app::middleware::auth::JwtAuthenticator;
use crate::config::AppConfig;
use crate::integrations::database::Databases;
use crate::integrations::http_client::HttpClients;
use crate::integrations::qrcode::QrGenerator;
use crate::integrations::ws::WsHub;

/// Everything a handler can reach. Cheap to clone; built once by the
/// bootstrap and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub databases: Databases,
    pub authenticator: JwtAuthenticator,
    pub clients: HttpClients,
    pub qrcode: QrGenerator,
    pub hub: WsHub,
}
