use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// The fixed set of choices offered by the poll. Never fetched from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    Tmc,
    Bjp,
    Cpim,
    Others,
}

impl Party {
    pub const ALL: [Party; 4] = [Party::Tmc, Party::Bjp, Party::Cpim, Party::Others];

    /// Short key sent to the backend as `partyName`.
    pub fn id(self) -> &'static str {
        match self {
            Party::Tmc => "tmc",
            Party::Bjp => "bjp",
            Party::Cpim => "cpim",
            Party::Others => "others",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Party::Tmc => "TMC",
            Party::Bjp => "BJP",
            Party::Cpim => "CPIM",
            Party::Others => "Others",
        }
    }

    /// Matches a backend-reported option name against the id or display name,
    /// ignoring case. Unknown names yield `None`.
    pub fn from_backend_name(name: &str) -> Option<Party> {
        let name = name.trim();
        Party::ALL
            .into_iter()
            .find(|party| party.id().eq_ignore_ascii_case(name) || party.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown option '{0}'")]
pub struct UnknownParty(pub String);

impl FromStr for Party {
    type Err = UnknownParty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Party::from_backend_name(s).ok_or_else(|| UnknownParty(s.trim().to_string()))
    }
}

// Wire payloads

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    pub poll_id: String,
    pub user_hash: String,
    pub device_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub poll_id: String,
    pub party_name: String,
}

/// Body shape for `GET /api/poll/result`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsPayload {
    pub parties: Vec<PartyTally>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyTally {
    pub name: String,
    pub votes: u64,
}

/// Latest known counts, keyed by the name the backend reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsSnapshot {
    pub counts: HashMap<String, u64>,
    pub fetched_at: DateTime<Utc>,
}

impl ResultsSnapshot {
    pub fn from_payload(payload: ResultsPayload, fetched_at: DateTime<Utc>) -> Self {
        let counts = payload
            .parties
            .into_iter()
            .map(|tally| (tally.name, tally.votes))
            .collect();

        Self { counts, fetched_at }
    }

    /// Count for one configured option. Entries whose names only differ in case
    /// from the option id or display name are summed together.
    pub fn votes_for(&self, party: Party) -> u64 {
        self.counts
            .iter()
            .filter(|(name, _)| Party::from_backend_name(name) == Some(party))
            .map(|(_, votes)| *votes)
            .sum()
    }

    /// Sum of every reported count, including names outside the option set.
    pub fn total_votes(&self) -> u64 {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_match_id_or_display_name() {
        assert_eq!(Party::from_backend_name("BJP"), Some(Party::Bjp));
        assert_eq!(Party::from_backend_name("others"), Some(Party::Others));
        assert_eq!(Party::from_backend_name(" Cpim "), Some(Party::Cpim));
        assert_eq!(Party::from_backend_name("INC"), None);
    }

    #[test]
    fn parse_rejects_unknown_option() {
        let err = "congress".parse::<Party>().unwrap_err();
        assert_eq!(err.to_string(), "unknown option 'congress'");
        assert_eq!("tmc".parse::<Party>().unwrap(), Party::Tmc);
    }

    #[test]
    fn wire_requests_use_camel_case() {
        let init = InitRequest {
            poll_id: "wb-2026".to_string(),
            user_hash: "abcd123".to_string(),
            device_id: "dev-1".to_string(),
        };
        let json = serde_json::to_value(&init).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "pollId": "wb-2026", "userHash": "abcd123", "deviceId": "dev-1" })
        );

        let vote = VoteRequest { poll_id: "wb-2026".to_string(), party_name: "bjp".to_string() };
        let json = serde_json::to_value(&vote).unwrap();
        assert_eq!(json, serde_json::json!({ "pollId": "wb-2026", "partyName": "bjp" }));
    }

    #[test]
    fn unknown_names_count_toward_total_only() {
        let payload: ResultsPayload = serde_json::from_value(serde_json::json!({
            "parties": [
                { "name": "TMC", "votes": 4 },
                { "name": "INC", "votes": 6 }
            ]
        }))
        .unwrap();
        let snapshot = ResultsSnapshot::from_payload(payload, Utc::now());

        assert_eq!(snapshot.votes_for(Party::Tmc), 4);
        assert_eq!(snapshot.votes_for(Party::Bjp), 0);
        assert_eq!(snapshot.total_votes(), 10);
    }
}
