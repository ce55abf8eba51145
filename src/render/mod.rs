use crate::controller::{PollView, SessionState};
use crate::models::Party;
use crate::voting::PollResults;

pub const TITLE: &str = "West Bengal Public Mandate – 2026";
pub const SUBTITLE: &str = "One vote per person · Anonymous";
const BAR_WIDTH: usize = 30;

/// Renders the whole page as plain text.
pub fn render_page(view: &PollView<'_>) -> String {
    let mut out = String::new();

    if *view.state == SessionState::Loading {
        out.push_str("Loading poll…\n");
        return out;
    }

    out.push_str(&format!("{}\n{}\n\n", TITLE, SUBTITLE));

    if let Some(error) = view.error {
        out.push_str(&format!("! {}\n\n", error));
    }

    match view.state {
        SessionState::AlreadyVoted { chosen } => {
            out.push_str("You have already voted\n");
            if let Some(party) = chosen {
                out.push_str(&format!("{}\n", party.id().to_uppercase()));
            }
        }
        _ => {
            for (i, party) in Party::ALL.iter().enumerate() {
                out.push_str(&format!("  [{}] {}\n", i + 1, party.name()));
            }
        }
    }

    if let Some(results) = &view.results {
        out.push('\n');
        out.push_str(&render_results(results));
        if let Some(updated) = view.last_updated {
            out.push_str(&format!("Last updated: {}\n", updated.format("%Y-%m-%d %H:%M:%S UTC")));
        }
    }

    out
}

pub fn render_results(results: &PollResults) -> String {
    let mut out = String::from("Current Results\n");

    for row in &results.rows {
        let line = format!("{:<8} {} ({:.1}%)\n", row.party.name(), row.votes, row.percentage);
        out.push_str(&line);
        out.push_str(&format!("  {}\n", bar(row.percentage)));
    }

    out.push_str(&format!("Total votes: {}\n", results.total_votes));
    out
}

fn bar(percentage: f64) -> String {
    let filled = ((percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

/// Maps a typed choice (number from the list, or an option name) to a party.
pub fn parse_choice(input: &str) -> Option<Party> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| Party::ALL.get(i).copied());
    }
    input.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voting::VoteCount;

    fn sample_results() -> PollResults {
        PollResults {
            rows: vec![
                VoteCount { party: Party::Tmc, votes: 10, percentage: 33.3 },
                VoteCount { party: Party::Bjp, votes: 15, percentage: 50.0 },
                VoteCount { party: Party::Cpim, votes: 5, percentage: 16.7 },
                VoteCount { party: Party::Others, votes: 0, percentage: 0.0 },
            ],
            total_votes: 30,
        }
    }

    #[test]
    fn results_rows_show_count_and_percentage() {
        let text = render_results(&sample_results());
        assert!(text.contains("BJP      15 (50.0%)"));
        assert!(text.contains("TMC      10 (33.3%)"));
        assert!(text.contains("Total votes: 30"));
    }

    #[test]
    fn eligible_page_offers_all_options_and_no_results() {
        let state = SessionState::EligibleToVote;
        let view = PollView { state: &state, error: None, results: None, last_updated: None };
        let page = render_page(&view);

        for party in Party::ALL {
            assert!(page.contains(party.name()));
        }
        assert!(!page.contains("Current Results"));
        assert!(!page.contains("already voted"));
    }

    #[test]
    fn voted_page_names_choice_uppercased_and_hides_controls() {
        let state = SessionState::AlreadyVoted { chosen: Some(Party::Others) };
        let view = PollView {
            state: &state,
            error: None,
            results: Some(sample_results()),
            last_updated: None,
        };
        let page = render_page(&view);

        assert!(page.contains("You have already voted\nOTHERS\n"));
        assert!(!page.contains("[1]"));
        assert!(page.contains("Current Results"));
    }

    #[test]
    fn error_banner_is_verbatim() {
        let state = SessionState::EligibleToVote;
        let view = PollView { state: &state, error: Some("duplicate vote"), results: None, last_updated: None };
        assert!(render_page(&view).contains("! duplicate vote\n"));
    }

    #[test]
    fn header_and_banner_lead_the_page() {
        let state = SessionState::EligibleToVote;
        let view = PollView { state: &state, error: Some("Request failed"), results: None, last_updated: None };
        let expected = format!("{}\n{}\n\n! Request failed\n\n  [1] TMC\n", TITLE, SUBTITLE);
        assert!(render_page(&view).starts_with(&expected));
    }

    #[test]
    fn loading_page_is_minimal() {
        let state = SessionState::Loading;
        let view = PollView { state: &state, error: None, results: None, last_updated: None };
        assert_eq!(render_page(&view), "Loading poll…\n");
    }

    #[test]
    fn bar_is_proportional() {
        assert_eq!(bar(0.0), format!("[{}]", " ".repeat(BAR_WIDTH)));
        assert_eq!(bar(100.0), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(bar(50.0).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn choices_parse_by_number_or_name() {
        assert_eq!(parse_choice("2"), Some(Party::Bjp));
        assert_eq!(parse_choice(" cpim "), Some(Party::Cpim));
        assert_eq!(parse_choice("0"), None);
        assert_eq!(parse_choice("5"), None);
        assert_eq!(parse_choice("inc"), None);
    }
}
