//! Login and biometric enrollment.

use serde::Serialize;
use serde_json::json;

use super::client::{ApiClient, ApiError};
use super::types::LoginSession;

#[derive(Serialize, Debug)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    device_id: &'a str,
}

#[derive(Serialize, Debug)]
struct BiometricLoginRequest<'a> {
    user_id: i64,
    biometric_token: &'a str,
    device_id: &'a str,
}

/// Token minted by the server for this device. Stored in the keystore and
/// replayed by `login_biometric`.
#[derive(serde::Deserialize, Debug)]
pub struct BiometricEnrollment {
    pub biometric_token: String,
}

impl ApiClient {
    /// Exchanges username and password for a session token.
    /// The caller decides whether to `authorize` the client with it.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSession, ApiError> {
        let body = LoginRequest {
            username,
            password,
            device_id: self.device_id(),
        };
        self.post_json("/auth/login", &body).await
    }

    /// Signs in with a previously enrolled biometric token instead of a
    /// password. The server checks the token against this device id.
    pub async fn login_biometric(
        &self,
        user_id: i64,
        biometric_token: &str,
    ) -> Result<LoginSession, ApiError> {
        let body = BiometricLoginRequest {
            user_id,
            biometric_token,
            device_id: self.device_id(),
        };
        self.post_json("/auth/login/biometric", &body).await
    }

    /// Asks the server to mint a biometric token for this device.
    /// Requires an authorized client.
    pub async fn enroll_biometric(&self) -> Result<BiometricEnrollment, ApiError> {
        self.post_json("/auth/biometric/enroll", &json!({})).await
    }
}
