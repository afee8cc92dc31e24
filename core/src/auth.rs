use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};

pub trait AuthenticatableUser {
    type Id;

    fn get_id(&self) -> Self::Id;
    fn get_username(&self) -> &str;
}

/// Issues and checks credentials for users of type `T`.
///
/// The authenticator itself travels in the request extensions, so it must be
/// cheap to clone.
pub trait Authenticator<T>
where
    T: AuthenticatableUser,
{
    type Credentials;
    type Token;
    type Error;

    fn attempt(
        &self,
        credentials: Self::Credentials,
    ) -> impl std::future::Future<Output = Result<T, Self::Error>> + Send;
    fn generate_token(&self, user: &T) -> Result<Self::Token, Self::Error>;

    fn verify_header_name(&self) -> &'static str;
    fn verify(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<T, StatusCode>> + Send;
}

/// Rejects requests that do not carry a token accepted by `T`, and stores
/// the verified user in the request extensions.
#[tracing::instrument(level = "debug", skip(request, next))]
pub async fn auth_middleware<T, R>(mut request: Request, next: Next) -> Result<Response, StatusCode>
where
    T: Authenticator<R> + Send + Sync + 'static,
    R: AuthenticatableUser + Send + Sync + Clone + 'static,
{
    let Some(authenticator) = request.extensions().get::<T>() else {
        tracing::error!("no Authenticator Extension available");

        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    };

    let Some(header) = request.headers().get(authenticator.verify_header_name()) else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user = authenticator.verify(header).await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
