use anyhow::Context;

/// Credentials supplied by the environment at startup; immutable thereafter.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Pushover application token.
    pub pushover_api_token: String,

    /// Pushover recipient key.
    pub pushover_user_key: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let pushover_api_token =
            std::env::var("PUSHOVER_API_TOKEN").context("PUSHOVER_API_TOKEN is not set")?;
        let pushover_user_key =
            std::env::var("PUSHOVER_USER_KEY").context("PUSHOVER_USER_KEY is not set")?;

        Ok(Self {
            pushover_api_token,
            pushover_user_key,
        })
    }
}
