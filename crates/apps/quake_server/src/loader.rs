//! Start-up feed loading.
//!
//! Each feed runs as its own task and posts exactly one completion event into
//! the shared session. Neither task waits for the other, and the write lock is
//! held only while the event is applied.

use std::sync::Arc;

use parking_lot::RwLock;
use scene::{MapEvent, SessionHost};
use tokio::task::JoinHandle;
use tracing::info;

use crate::fetch::FeedFetcher;

pub type SharedHost = Arc<RwLock<SessionHost>>;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSources {
    pub earthquakes_url: String,
    pub plates_url: Option<String>,
}

pub fn spawn_feed_loads(
    host: SharedHost,
    fetcher: FeedFetcher,
    sources: FeedSources,
) -> Vec<JoinHandle<()>> {
    let mut tasks = Vec::with_capacity(2);

    {
        let host = host.clone();
        let fetcher = fetcher.clone();
        let url = sources.earthquakes_url;
        tasks.push(tokio::spawn(async move {
            info!(%url, "fetching earthquake feed");
            let event = match fetcher.fetch_earthquakes(&url).await {
                Ok(feed) => MapEvent::EarthquakesLoaded(feed),
                Err(err) => MapEvent::EarthquakesFailed {
                    reason: err.to_string(),
                },
            };
            host.write().post(event);
        }));
    }

    if let Some(url) = sources.plates_url {
        tasks.push(tokio::spawn(async move {
            info!(%url, "fetching tectonic plate boundaries");
            let event = match fetcher.fetch_boundaries(&url).await {
                Ok(features) => MapEvent::BoundariesLoaded(features),
                Err(err) => MapEvent::BoundariesFailed {
                    reason: err.to_string(),
                },
            };
            host.write().post(event);
        }));
    }

    tasks
}
