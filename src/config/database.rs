use std::fmt;

use keel_core::config::{self, ConfigSource};
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Driver {
    MySql,
    Postgres,
}

impl Driver {
    fn scheme(self) -> &'static str {
        match self {
            Driver::MySql => "mysql",
            Driver::Postgres => "postgres",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Driver::MySql => 3306,
            Driver::Postgres => 5432,
        }
    }
}

/// One named connection pool. Every field is read from variables sharing a
/// prefix, e.g. `DB_HOST`, `DB_PORT` for the primary connection.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub name: String,
    pub driver: Driver,
    pub host: String,
    pub user: String,
    pub port: u16,
    pub password: String,
    pub database: String,
    pub pool_min: u32,
    pub pool_max: u32,
    pub debug: bool,
}

impl DatabaseConfig {
    /// `mysql`: the `DB_*` variables.
    pub fn primary(source: &dyn ConfigSource) -> Self {
        Self::read(source, "mysql", Driver::MySql, "DB", "root", "test")
    }

    /// `mysql2`: the `DB2_*` variables. There is no built-in password.
    pub fn secondary(source: &dyn ConfigSource) -> Self {
        Self::read(source, "mysql2", Driver::MySql, "DB2", "root", "test2")
    }

    /// `pg`: the `PG_*` variables, with the postgres default port.
    pub fn postgres(source: &dyn ConfigSource) -> Self {
        Self::read(source, "pg", Driver::Postgres, "PG", "postgres", "test")
    }

    fn read(
        source: &dyn ConfigSource,
        name: &str,
        driver: Driver,
        prefix: &str,
        default_user: &str,
        default_database: &str,
    ) -> Self {
        let key = |suffix: &str| format!("{prefix}_{suffix}");

        DatabaseConfig {
            name: name.to_owned(),
            driver,
            host: config::string_or(source, &key("HOST"), "localhost"),
            user: config::string_or(source, &key("USER"), default_user),
            port: config::parse_or(source, &key("PORT"), driver.default_port()),
            password: config::secret_or_empty(source, &key("PASSWORD")),
            database: config::string_or(source, &key("NAME"), default_database),
            pool_min: config::parse_or(source, &key("POOL_MIN"), 0),
            pool_max: config::parse_or(source, &key("POOL_MAX"), 100),
            debug: config::parse_or(source, &key("DEBUG"), true),
        }
    }

    /// Connection URL with user and password percent-encoded.
    pub fn url(&self) -> anyhow::Result<String> {
        let mut url = Url::parse(&format!(
            "{}://{}:{}/{}",
            self.driver.scheme(),
            self.host,
            self.port,
            self.database
        ))?;

        url.set_username(&self.user)
            .map_err(|_| anyhow::anyhow!("cannot use `{}` as a database user", self.user))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| anyhow::anyhow!("cannot set the password of `{}`", self.name))?;
        }

        Ok(url.into())
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("name", &self.name)
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("pool_min", &self.pool_min)
            .field("pool_max", &self.pool_max)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
