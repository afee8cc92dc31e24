use std::fmt;
use std::path::PathBuf;

use keel_core::config::{self, ConfigBuilder, ConfigSource};

use super::DatabaseConfig;

/// An outbound API reachable under a short alias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub alias: String,
    pub base_url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub secret_key: String,
    pub jwt_expiry_mins: i64,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub body_limit: usize,
    pub migrate: bool,
    pub databases: Vec<DatabaseConfig>,
    pub clients: Vec<ClientConfig>,
}

impl ConfigBuilder for AppConfig {
    fn build_from(source: &dyn ConfigSource) -> anyhow::Result<Self> {
        let host = config::string_or(source, "HOST", "0.0.0.0");
        let port = config::parse_or(source, "PORT", 3000);

        let secret_key = config::required(source, "SECRET_KEY")?;
        let jwt_expiry_mins = config::parse_or(source, "JWT_EXPIRY_MINS", 60);

        let cors_origins = config::string_or(source, "CORS_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty() && *origin != "*")
            .map(str::to_owned)
            .collect();

        let upload_dir = config::string_or(source, "UPLOAD_DIR", "uploads").into();
        let body_limit = config::parse_or(source, "BODY_LIMIT", 10 * 1024 * 1024);
        let migrate = config::parse_or(source, "DB_MIGRATE", false);

        let databases = vec![
            DatabaseConfig::primary(source),
            DatabaseConfig::secondary(source),
            DatabaseConfig::postgres(source),
        ];

        let clients = vec![
            ClientConfig {
                alias: "v1".into(),
                base_url: config::string_or(source, "V1_BASE_URL", "https://apingweb.com/api/rest"),
            },
            ClientConfig {
                alias: "v2".into(),
                base_url: config::string_or(source, "V2_BASE_URL", "https://randomuser.me/api"),
            },
        ];

        Ok(AppConfig {
            host,
            port,
            secret_key,
            jwt_expiry_mins,
            cors_origins,
            upload_dir,
            body_limit,
            migrate,
            databases,
            clients,
        })
    }
}

impl AppConfig {
    /// Address advertised in the OpenAPI document.
    pub fn public_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_expiry_mins", &self.jwt_expiry_mins)
            .field("cors_origins", &self.cors_origins)
            .field("upload_dir", &self.upload_dir)
            .field("body_limit", &self.body_limit)
            .field("migrate", &self.migrate)
            .field("databases", &self.databases)
            .field("clients", &self.clients)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        let env = HashMap::from([("SECRET_KEY", "s3cret")]);
        let config = AppConfig::build_from(&env).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.jwt_expiry_mins, 60);
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.body_limit, 10 * 1024 * 1024);
        assert!(!config.migrate);
        assert_eq!(config.public_url(), "http://0.0.0.0:3000");
    }

    #[test]
    fn secret_key_is_required() {
        let err = AppConfig::build_from(&HashMap::<&str, &str>::new()).unwrap_err();

        assert!(err.to_string().contains("SECRET_KEY"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let env = HashMap::from([
            ("SECRET_KEY", "s3cret"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
        ]);
        let config = AppConfig::build_from(&env).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8081);
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn three_connections_in_registration_order() {
        let config = AppConfig::build_from(&HashMap::from([("SECRET_KEY", "s3cret")])).unwrap();
        let names: Vec<_> = config.databases.iter().map(|db| db.name.as_str()).collect();

        assert_eq!(names, ["mysql", "mysql2", "pg"]);
    }

    #[test]
    fn outbound_clients_have_fixed_aliases() {
        let config = AppConfig::build_from(&HashMap::from([("SECRET_KEY", "s3cret")])).unwrap();

        assert_eq!(
            config.clients,
            vec![
                ClientConfig { alias: "v1".into(), base_url: "https://apingweb.com/api/rest".into() },
                ClientConfig { alias: "v2".into(), base_url: "https://randomuser.me/api".into() },
            ]
        );
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let config = AppConfig::build_from(&HashMap::from([("SECRET_KEY", "s3cret")])).unwrap();

        assert!(!format!("{config:?}").contains("s3cret"));
    }
}
