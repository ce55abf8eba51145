mod api;
mod config;
mod controller;
mod models;
mod render;
mod store;
mod tasks;
mod voting;

use api::{HttpPollApi, PollApi};
use config::PollConfig;
use controller::{PollController, SessionState};
use log::{error, info, warn};
use render::{parse_choice, render_page};
use store::{FileStore, KeyValueStore};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match PollConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let store = match FileStore::open(&config.storage_path) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open client storage: {}", e);
            return;
        }
    };

    let api = match HttpPollApi::new(&config.api_base_url) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    info!("Using poll {} at {}", config.poll_id, config.api_base_url);
    let refresh_interval = config.refresh_interval;
    let mut controller = PollController::new(config, api, store);

    println!("{}", render_page(&controller.view()));
    controller.initialize().await;
    println!("{}", render_page(&controller.view()));

    if *controller.state() == SessionState::EligibleToVote && !prompt_for_vote(&mut controller).await {
        return;
    }

    if let Some(every) = refresh_interval.filter(|_| controller.results_visible()) {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        tasks::results_refresher::watch_results(&mut controller, every, shutdown, |c| {
            println!("{}", render_page(&c.view()));
        })
        .await;
    }
}

/// Reads choices from stdin until a vote is accepted. Returns `false` on end of input.
async fn prompt_for_vote<A: PollApi, S: KeyValueStore>(controller: &mut PollController<A, S>) -> bool {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while *controller.state() == SessionState::EligibleToVote {
        println!("Choose an option (number or name):");
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return false,
            Err(e) => {
                error!("Failed to read input: {}", e);
                return false;
            }
        };

        let Some(party) = parse_choice(&line) else {
            println!("Unknown option '{}'", line.trim());
            continue;
        };

        controller.cast_vote(party).await;
        println!("{}", render_page(&controller.view()));
    }

    true
}
