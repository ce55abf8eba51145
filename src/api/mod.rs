use crate::models::{InitRequest, VoteRequest};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

pub const INIT_PATH: &str = "/api/poll/init";
pub const VOTE_PATH: &str = "/api/poll/vote";
pub const RESULT_PATH: &str = "/api/poll/result";

pub const VOTE_TOKEN_HEADER: &str = "X-Vote-Token";
pub const FALLBACK_MESSAGE: &str = "Request failed";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No response was obtained at all.
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Text for the error banner. A failed exchange with no response reads
    /// the same as a rejection without a message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => FALLBACK_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Init(InitRequest),
    Vote(VoteRequest),
    Results { poll_id: String },
}

impl ApiRequest {
    fn route(&self) -> (Method, &'static str) {
        match self {
            ApiRequest::Init(_) => (Method::POST, INIT_PATH),
            ApiRequest::Vote(_) => (Method::POST, VOTE_PATH),
            ApiRequest::Results { .. } => (Method::GET, RESULT_PATH),
        }
    }
}

/// Raw outcome of one exchange, before success is judged.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    /// `None` when the body was empty or not JSON.
    pub body: Option<Value>,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// A fresh vote token carried in the body, if any.
    pub fn vote_token(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.get("voteToken"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
    }

    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.is_success() {
            return self
                .body
                .ok_or_else(|| ApiError::Malformed("response body is not JSON".to_string()));
        }

        let message = self
            .body
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(FALLBACK_MESSAGE)
            .to_string();

        Err(ApiError::Rejected { status: self.status, message })
    }
}

/// The remote poll service as seen by the controller.
#[async_trait]
pub trait PollApi: Send + Sync {
    async fn send(&self, request: &ApiRequest, vote_token: Option<&str>) -> Result<ApiReply, ApiError>;
}

pub struct HttpPollApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPollApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl PollApi for HttpPollApi {
    async fn send(&self, request: &ApiRequest, vote_token: Option<&str>) -> Result<ApiReply, ApiError> {
        let (method, path) = request.route();
        debug!("{} {}", method, path);

        let mut builder = self
            .http
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = vote_token {
            builder = builder.header(VOTE_TOKEN_HEADER, token);
        }

        let body = match request {
            ApiRequest::Init(init) => Some(serde_json::to_vec(init)),
            ApiRequest::Vote(vote) => Some(serde_json::to_vec(vote)),
            ApiRequest::Results { poll_id } => {
                builder = builder.query(&[("pollId", poll_id)]);
                None
            }
        };
        if let Some(body) = body {
            builder = builder.body(body.map_err(|e| ApiError::Malformed(e.to_string()))?);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let body = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice::<Value>(&bytes).ok()
        };
        debug!("{} {} -> {}", request.route().0, path, status);

        Ok(ApiReply { status, body })
    }
}
