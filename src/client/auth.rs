use crate::domain::account::{AccountProfile, LoginRequest, SignupRequest};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Error, Debug)]
pub enum ClientError {
    /// A form field was left blank; nothing was sent.
    #[error("enter the {0}")]
    MissingField(&'static str),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{msg}")]
    Rejected {
        status: StatusCode,
        kind: Option<String>,
        msg: String,
    },
}

#[derive(Debug, Clone)]
pub struct AuthReply {
    pub msg: String,
    pub account: Option<AccountProfile>,
}

#[derive(Deserialize, Default)]
struct ReplyBody {
    #[serde(default)]
    msg: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    account: Option<AccountProfile>,
}

/// Talks to `/auth/*` the way the login and signup forms do: blank fields are
/// caught locally, everything else is left to the server.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[instrument(skip(self, name, password))]
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<AuthReply, ClientError> {
        require("email", email)?;
        require("password", password)?;
        require("name", name)?;

        let body = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/signup", &body).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthReply, ClientError> {
        require("email", email)?;
        require("password", password)?;

        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &body).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<AuthReply, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Sending auth request");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let reply: ReplyBody = serde_json::from_str(&text).unwrap_or_default();

        if status.is_success() {
            return Ok(AuthReply {
                msg: reply.msg,
                account: reply.account,
            });
        }

        warn!(status = %status, kind = ?reply.error, "Auth request rejected");
        let msg = if reply.msg.is_empty() {
            status.canonical_reason().unwrap_or("request rejected").to_string()
        } else {
            reply.msg
        };
        Err(ClientError::Rejected {
            status,
            kind: reply.error,
            msg,
        })
    }
}

impl Default for AuthClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::MissingField(field));
    }
    Ok(())
}
