//! Login and logout.
//!
//! Login exchanges credentials for a token and stores it; logout is local
//! only (the backend keeps no session to revoke).

use zeroize::Zeroize;

use crate::api::ApiClient;
use crate::guard::Route;
use crate::screens::ScreenError;
use crate::session::SessionStore;

pub const LOGIN_FALLBACK: &str = "Error al iniciar sesión";
pub const MSG_CREDENTIALS_REQUIRED: &str = "Ingrese usuario y contraseña";

/// Login form. The password is wiped on drop.
#[derive(Default, Zeroize)]
#[zeroize(drop)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn validate(&self) -> Result<(), ScreenError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ScreenError::validation(MSG_CREDENTIALS_REQUIRED));
        }
        Ok(())
    }
}

/// Submit `form`. On success the token is stored and the default
/// authenticated route is returned; on failure the form is left untouched.
pub async fn login(client: &ApiClient, form: &LoginForm) -> Result<Route, ScreenError> {
    form.validate()?;

    let token = client
        .request_token(form.username.trim(), &form.password)
        .await
        .map_err(|e| ScreenError::api_or(LOGIN_FALLBACK, e))?;

    client
        .session()
        .set_credential(&token.access_token)
        .map_err(|e| ScreenError::api_or(LOGIN_FALLBACK, e.into()))?;

    tracing::info!(username = %form.username.trim(), "Logged in");
    Ok(Route::default())
}

/// Forget the credential and go back to the login screen.
pub fn logout(session: &SessionStore) -> Result<Route, ScreenError> {
    session.clear_credential().map_err(|e| {
        ScreenError::api_or("No se pudo cerrar la sesión", e.into())
    })?;
    Ok(Route::Login)
}
