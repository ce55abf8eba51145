use crate::api::{ApiError, ApiRequest, PollApi};
use crate::config::PollConfig;
use crate::models::{InitRequest, Party, ResultsPayload, ResultsSnapshot, VoteRequest};
use crate::store::{self, KeyValueStore, VOTE_TOKEN_KEY};
use crate::voting::{self, PollResults};
use chrono::Utc;
use lazy_static::lazy_static;
use log::{error, info, warn};
use regex::Regex;
use serde_json::Value;

pub const RESULTS_ERROR: &str = "Failed to load poll results";

lazy_static! {
    static ref PRIOR_PARTICIPATION: Regex =
        Regex::new(r"(?i)already\s+(voted|participated|registered)").expect("valid pattern");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    EligibleToVote,
    /// `chosen` is only known when the vote was cast in this session.
    AlreadyVoted { chosen: Option<Party> },
}

/// Read-only view handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PollView<'a> {
    pub state: &'a SessionState,
    pub error: Option<&'a str>,
    /// `None` while results are hidden.
    pub results: Option<PollResults>,
    pub last_updated: Option<chrono::DateTime<Utc>>,
}

pub struct PollController<A, S> {
    config: PollConfig,
    api: A,
    store: S,
    state: SessionState,
    error: Option<String>,
    snapshot: Option<ResultsSnapshot>,
}

impl<A: PollApi, S: KeyValueStore> PollController<A, S> {
    pub fn new(config: PollConfig, api: A, store: S) -> Self {
        Self {
            config,
            api,
            store,
            state: SessionState::Loading,
            error: None,
            snapshot: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Option<&ResultsSnapshot> {
        self.snapshot.as_ref()
    }

    /// Results are revealed only once the visitor has voted.
    pub fn results_visible(&self) -> bool {
        matches!(self.state, SessionState::AlreadyVoted { .. })
    }

    pub fn view(&self) -> PollView<'_> {
        PollView {
            state: &self.state,
            error: self.error.as_deref(),
            results: self
                .results_visible()
                .then(|| voting::calculate_results(self.snapshot.as_ref())),
            last_updated: self.snapshot.as_ref().map(|s| s.fetched_at),
        }
    }

    /// Registers this device for the poll and settles the initial session state.
    pub async fn initialize(&mut self) {
        let request = ApiRequest::Init(InitRequest {
            poll_id: self.config.poll_id.clone(),
            user_hash: self.config.user_hash.clone(),
            device_id: store::device_id(&mut self.store),
        });

        match self.exchange(&request).await {
            Ok(_) => {
                info!("Registered for poll {}", self.config.poll_id);
                self.state = SessionState::EligibleToVote;
            }
            Err(e) => {
                if is_prior_participation(&e) {
                    info!("Device already participated in poll {}", self.config.poll_id);
                } else {
                    warn!("Registration for poll {} failed: {}", self.config.poll_id, e);
                }
                self.state = SessionState::AlreadyVoted { chosen: None };
                self.refresh_results().await;
            }
        }
    }

    pub async fn cast_vote(&mut self, party: Party) {
        let request = ApiRequest::Vote(VoteRequest {
            poll_id: self.config.poll_id.clone(),
            party_name: party.id().to_string(),
        });

        match self.exchange(&request).await {
            Ok(_) => {
                info!("Vote for {} accepted", party.id());
                self.state = SessionState::AlreadyVoted { chosen: Some(party) };
                self.error = None;
                self.refresh_results().await;
            }
            Err(e) => {
                warn!("Vote for {} rejected: {}", party.id(), e);
                self.error = Some(e.user_message());
            }
        }
    }

    /// Replaces the snapshot on success; keeps the previous one on any failure.
    pub async fn refresh_results(&mut self) {
        let request = ApiRequest::Results { poll_id: self.config.poll_id.clone() };

        let payload = self.exchange(&request).await.and_then(|body| {
            serde_json::from_value::<ResultsPayload>(body).map_err(|e| ApiError::Malformed(e.to_string()))
        });

        match payload {
            Ok(payload) => {
                self.snapshot = Some(ResultsSnapshot::from_payload(payload, Utc::now()));
                // A vote rejection stays up; only our own stale message goes.
                if self.error.as_deref() == Some(RESULTS_ERROR) {
                    self.error = None;
                }
            }
            Err(e) => {
                error!("Failed to load results for poll {}: {}", self.config.poll_id, e);
                self.error = Some(RESULTS_ERROR.to_string());
            }
        }
    }

    // Shared request path: attach the stored token, persist any new token, then judge success.
    async fn exchange(&mut self, request: &ApiRequest) -> Result<Value, ApiError> {
        let token = self.store.get(VOTE_TOKEN_KEY);
        let reply = self.api.send(request, token.as_deref()).await?;

        if let Some(new_token) = reply.vote_token() {
            if let Err(e) = self.store.set(VOTE_TOKEN_KEY, new_token) {
                warn!("Could not persist vote token: {}", e);
            }
        }

        reply.into_result()
    }
}

fn is_prior_participation(error: &ApiError) -> bool {
    match error {
        ApiError::Rejected { status: 403 | 409, .. } => true,
        ApiError::Rejected { message, .. } => PRIOR_PARTICIPATION.is_match(message),
        _ => false,
    }
}
