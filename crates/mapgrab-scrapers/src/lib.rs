pub mod google_maps;

use std::time::Duration;

use async_trait::async_trait;
use mapgrab_core::Result;
use tracing::debug;

pub use google_maps::{GoogleMapsScraper, ScrapeReport};

/// A single search to run against the map service.
#[derive(Debug, Clone)]
pub struct ScrapeQuery {
    pub search: String,
    /// Target listing count; `None` means scrape everything the feed renders.
    pub target: Option<usize>,
}

impl ScrapeQuery {
    pub fn new(search: impl Into<String>, target: Option<usize>) -> Self {
        Self {
            search: search.into(),
            target,
        }
    }

    /// The target the scroll loop works against. An absent target is
    /// effectively unbounded, so the loop ends only when the feed stalls.
    pub fn effective_target(&self) -> usize {
        self.target.unwrap_or(usize::MAX)
    }
}

/// Wait tuning for the browser session. The map UI offers no completion
/// signals for feed loading, so these settle intervals bound how long each
/// action is given before the next poll.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// After filling the search input, before pressing Enter.
    pub search_fill: Duration,
    /// After submitting the search, before touching the results feed.
    pub search_settle: Duration,
    /// After each scroll of the results feed.
    pub scroll_settle: Duration,
    /// Upper bound on waiting for the detail panel after clicking a listing.
    pub detail_timeout: Duration,
    /// Poll interval while waiting for the detail panel.
    pub detail_poll: Duration,
    /// Navigation timeout for the initial page load.
    pub page_load_timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            search_fill: Duration::from_millis(3000),
            search_settle: Duration::from_millis(5000),
            scroll_settle: Duration::from_millis(3000),
            detail_timeout: Duration::from_millis(5000),
            detail_poll: Duration::from_millis(250),
            page_load_timeout: Duration::from_millis(60_000),
        }
    }
}

/// The incrementally loading results panel, reduced to the one operation the
/// scroll-termination policy needs. Implemented over a live WebDriver session
/// by [`GoogleMapsScraper`] and by mock feeds in tests.
#[async_trait]
pub trait ListingFeed {
    /// Scrolls the feed once, lets it settle, and returns the number of
    /// listing anchors currently rendered.
    async fn load_more(&mut self) -> Result<usize>;
}

/// Drives a [`ListingFeed`] until either `target` anchors are rendered or a
/// scroll loads nothing new, and returns how many anchors to keep: exactly
/// `target` in the first case, everything rendered in the second.
pub async fn settle_listing_count<F>(feed: &mut F, target: usize) -> Result<usize>
where
    F: ListingFeed + Send + ?Sized,
{
    let mut previously_counted = 0;
    loop {
        let count = feed.load_more().await?;
        if count >= target {
            debug!("feed reached target: {} rendered, keeping {}", count, target);
            return Ok(target);
        }
        if count == previously_counted {
            debug!("feed stalled at {} listings", count);
            return Ok(count);
        }
        debug!("currently rendered: {}", count);
        previously_counted = count;
    }
}
