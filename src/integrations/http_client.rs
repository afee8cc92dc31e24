use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::app::response::ApiError;
use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no outbound client named `{0}`")]
    UnknownAlias(String),

    #[error("`{0}` cannot be used as a base url")]
    CannotBeABase(String),

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::UnknownAlias(alias) => ApiError::NotFound(format!("no outbound client named `{alias}`")),
            ClientError::CannotBeABase(_) => ApiError::Internal(err.into()),
            ClientError::Request(err) => ApiError::Upstream(err.to_string()),
        }
    }
}

/// Preconfigured outbound APIs. All aliases share one connection pool.
#[derive(Clone)]
pub struct HttpClients {
    client: reqwest::Client,
    bases: Arc<BTreeMap<String, Url>>,
}

impl HttpClients {
    pub fn new(configs: &[ClientConfig]) -> anyhow::Result<Self> {
        let mut bases = BTreeMap::new();

        for config in configs {
            let base = Url::parse(&config.base_url)
                .map_err(|err| anyhow::anyhow!("invalid base url for `{}`: {err}", config.alias))?;
            if base.cannot_be_a_base() {
                return Err(ClientError::CannotBeABase(config.base_url.clone()).into());
            }

            tracing::info!(alias = %config.alias, base_url = %base, "outbound client configured");
            bases.insert(config.alias.clone(), base);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(HttpClients {
            client,
            bases: Arc::new(bases),
        })
    }

    pub fn base_url(&self, alias: &str) -> Option<&Url> {
        self.bases.get(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &Url)> {
        self.bases.iter().map(|(alias, url)| (alias.as_str(), url))
    }

    /// Appends `path` to the base url of `alias`, keeping the base path.
    /// `resolve("v1", "/users")` on `https://host/api/rest` gives
    /// `https://host/api/rest/users`.
    pub fn resolve(&self, alias: &str, path: &str) -> Result<Url, ClientError> {
        let mut url = self
            .base_url(alias)
            .cloned()
            .ok_or_else(|| ClientError::UnknownAlias(alias.to_owned()))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ClientError::CannotBeABase(alias.to_owned()))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
        }

        Ok(url)
    }

    #[tracing::instrument(level = "debug", skip(self, query))]
    pub async fn get_json(
        &self,
        alias: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.resolve(alias, path)?;

        let value = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clients() -> HttpClients {
        HttpClients::new(&[
            ClientConfig { alias: "v1".into(), base_url: "https://apingweb.com/api/rest".into() },
            ClientConfig { alias: "v2".into(), base_url: "https://randomuser.me/api".into() },
        ])
        .unwrap()
    }

    #[test]
    fn aliases_resolve_to_their_base_urls() {
        let clients = clients();

        assert_eq!(clients.base_url("v1").unwrap().as_str(), "https://apingweb.com/api/rest");
        assert_eq!(clients.base_url("v2").unwrap().as_str(), "https://randomuser.me/api");
        assert!(clients.base_url("v3").is_none());
    }

    #[test]
    fn resolve_keeps_the_base_path() {
        let clients = clients();

        assert_eq!(
            clients.resolve("v1", "/users").unwrap().as_str(),
            "https://apingweb.com/api/rest/users"
        );
        assert_eq!(
            clients.resolve("v1", "users/2/").unwrap().as_str(),
            "https://apingweb.com/api/rest/users/2"
        );
        assert_eq!(clients.resolve("v2", "").unwrap().as_str(), "https://randomuser.me/api");
    }

    #[test]
    fn unknown_alias_is_an_error() {
        assert!(matches!(
            clients().resolve("v9", "/x"),
            Err(ClientError::UnknownAlias(alias)) if alias == "v9"
        ));
    }

    #[test]
    fn invalid_base_urls_fail_construction() {
        let result = HttpClients::new(&[ClientConfig { alias: "bad".into(), base_url: "not a url".into() }]);

        assert!(result.is_err());
    }
}
