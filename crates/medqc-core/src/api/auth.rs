use tracing::info;

use crate::models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Log in and start a session with the returned token and user record.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self.post_json("/auth/login", request).await?;
        self.session().set_session(&response.access_token, &response.user);
        Ok(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let response: RegisterResponse = self.post_json("/auth/register", request).await?;
        info!(username = %request.username, "Registered account");
        Ok(response)
    }

    /// End the session locally. The backend keeps no logout endpoint.
    pub fn logout(&self) {
        self.session().clear_session();
    }
}
