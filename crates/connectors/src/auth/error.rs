use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// Silent acquisition is impossible; the user has to sign in.
    #[error("Sign-in required: no access token is available")]
    InteractionRequired,

    #[error("Token endpoint returned status {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("Token request failed: {0}")]
    Request(String),

    #[error("Missing identity setting: {0}")]
    MissingSetting(&'static str),
}
