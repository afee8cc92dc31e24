use std::path::Path;

use tokio::io::AsyncWriteExt;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use utoipa::openapi;
use utoipa::openapi::external_docs::ExternalDocs;
use utoipa::openapi::server::Server;
use utoipa::{Modify, OpenApi};

use crate::app::controller::{
    DemoControllerApi, IndexControllerApi, LoginControllerApi, SchemaControllerApi, SessionControllerApi,
    TestControllerApi, UploadControllerApi,
};
use crate::app::model::User;
use crate::app::response::Message;

pub const DOCS_PATH: &str = "/doc-swagger";
pub const DOCS_JSON_PATH: &str = "/doc-swagger/json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Keel Swagger",
        description = "Testing the Keel swagger API",
        version = "2.6.0"
    ),
    components(schemas(User, Message)),
    modifiers(&SecuritySchemes)
)]
pub struct MainApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        components.add_security_scheme("apiKey", SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("apiKey"))));
        components.add_security_scheme("bearerAuth", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

/// `/` stays `/demo` rather than `/demo/` once nested.
fn join_path(prefix: &str, path: &str) -> String {
    if path == "/" {
        prefix.to_owned()
    } else {
        format!("{prefix}{path}")
    }
}

/// The full document: every controller under the prefix the router mounts
/// it at, plus the server address when one is known.
pub fn openapi(server: Option<&str>) -> openapi::OpenApi {
    let mut doc = MainApiDoc::openapi();
    doc.merge(IndexControllerApi::openapi());

    let nested = [
        ("/demo", DemoControllerApi::openapi()),
        ("/test", TestControllerApi::openapi()),
        ("/login", LoginControllerApi::openapi()),
        ("/login", SessionControllerApi::openapi()),
        ("/upload", UploadControllerApi::openapi()),
        ("/schema", SchemaControllerApi::openapi()),
    ];
    for (prefix, api) in nested {
        doc = doc.nest_with_path_composer(prefix, api, join_path);
    }

    let mut external = ExternalDocs::new("http://localhost");
    external.description = Some("Find more info here".into());
    doc.external_docs = Some(external);

    if let Some(url) = server {
        doc.servers = Some(vec![Server::new(url)]);
    }

    doc
}

pub async fn generate_docs(path: &Path) -> anyhow::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await?;

    let docs = openapi(None).to_pretty_json()?;

    file.write_all(docs.as_bytes()).await?;
    tracing::info!(path = %path.display(), "OpenAPI document written");

    Ok(())
}
