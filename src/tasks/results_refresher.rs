use crate::api::PollApi;
use crate::controller::PollController;
use crate::store::KeyValueStore;
use log::{debug, info};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Re-fetches results every `every` and hands the controller to `on_update`
/// after each fetch. Returns once `shutdown` resolves.
pub async fn watch_results<A, S, F, Fut>(
    controller: &mut PollController<A, S>,
    every: Duration,
    shutdown: Fut,
    mut on_update: F,
) where
    A: PollApi,
    S: KeyValueStore,
    F: FnMut(&PollController<A, S>),
    Fut: Future<Output = ()>,
{
    info!("Refreshing results every {}s", every.as_secs());
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; results were just fetched.
    ticker.tick().await;

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Stopping results refresher");
                return;
            }
            _ = ticker.tick() => {
                debug!("Refreshing results");
                controller.refresh_results().await;
                on_update(controller);
            }
        }
    }
}
