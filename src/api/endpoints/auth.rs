//! `POST /auth/token`: exchange username and password for a bearer token.

use crate::api::{ApiClient, ApiError};
use crate::models::TokenResponse;

impl ApiClient {
    /// Request a token. Credentials go as form fields, not JSON.
    ///
    /// Does not store the token; the login flow decides what to do with it.
    pub async fn request_token(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        self.post_form(
            &["auth", "token"],
            &[("username", username), ("password", password)],
        )
        .await
    }
}
