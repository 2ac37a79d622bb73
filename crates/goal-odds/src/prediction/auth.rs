use tracing::{info, warn};

use super::client::PredictionApi;

/// Bearer token owned by one session.
///
/// With demo login enabled a missing token is fetched from the demo endpoint
/// before the first call. A failed login leaves the session unauthenticated and
/// the request goes out without a token.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    token: Option<String>,
    demo_login: bool,
}

impl AuthSession {
    pub fn new(demo_login: bool) -> Self {
        Self {
            token: None,
            demo_login,
        }
    }

    /// Start from an existing token. Demo login stays available for
    /// re-authentication after a 401.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            demo_login: true,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn demo_login_enabled(&self) -> bool {
        self.demo_login
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    /// Make sure a token is held if one can be obtained. Returns whether the
    /// session is authenticated afterwards.
    pub async fn ensure<A>(&mut self, api: &A) -> bool
    where
        A: PredictionApi + ?Sized,
    {
        if self.token.is_some() {
            return true;
        }
        if !self.demo_login {
            return false;
        }
        self.login(api).await
    }

    /// One demo-login attempt, replacing any held token.
    pub async fn login<A>(&mut self, api: &A) -> bool
    where
        A: PredictionApi + ?Sized,
    {
        match api.demo_login().await {
            Ok(token) => {
                info!("demo login succeeded");
                self.token = Some(token);
                true
            }
            Err(err) => {
                warn!(error = %err, "demo login failed; continuing unauthenticated");
                self.token = None;
                false
            }
        }
    }
}
