use crate::models::{Party, ResultsSnapshot};

// Breakdown of a snapshot over the fixed option set
#[derive(Debug, Clone, PartialEq)]
pub struct PollResults {
    pub rows: Vec<VoteCount>,
    pub total_votes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoteCount {
    pub party: Party,
    pub votes: u64,
    /// Already rounded to one decimal place.
    pub percentage: f64,
}

/// Rows always cover exactly `Party::ALL`, in that order. The total includes
/// names the backend reported outside the option set.
pub fn calculate_results(snapshot: Option<&ResultsSnapshot>) -> PollResults {
    let total_votes = snapshot.map_or(0, ResultsSnapshot::total_votes);

    let rows = Party::ALL
        .into_iter()
        .map(|party| {
            let votes = snapshot.map_or(0, |s| s.votes_for(party));
            VoteCount { party, votes, percentage: percentage(votes, total_votes) }
        })
        .collect();

    PollResults { rows, total_votes }
}

pub fn percentage(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (votes as f64 * 1000.0 / total as f64).round() / 10.0
}
