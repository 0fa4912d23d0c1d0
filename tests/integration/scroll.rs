use async_trait::async_trait;
use mapgrab_core::Result;
use mapgrab_scrapers::{settle_listing_count, ListingFeed, ScrapeQuery};

/// A results feed that grows by a fixed step per scroll up to a ceiling,
/// the way the live panel loads batches until the area is exhausted.
struct SteppedFeed {
    rendered: usize,
    step: usize,
    ceiling: usize,
}

#[async_trait]
impl ListingFeed for SteppedFeed {
    async fn load_more(&mut self) -> Result<usize> {
        self.rendered = (self.rendered + self.step).min(self.ceiling);
        Ok(self.rendered)
    }
}

#[tokio::test]
async fn test_target_below_available_keeps_exactly_target() {
    let mut feed = SteppedFeed {
        rendered: 0,
        step: 7,
        ceiling: 100,
    };
    let query = ScrapeQuery::new("coffee shop austin", Some(2));
    assert_eq!(
        settle_listing_count(&mut feed, query.effective_target())
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_target_above_available_keeps_rendered_count() {
    let mut feed = SteppedFeed {
        rendered: 0,
        step: 7,
        ceiling: 20,
    };
    let query = ScrapeQuery::new("coffee shop austin", Some(50));
    assert_eq!(
        settle_listing_count(&mut feed, query.effective_target())
            .await
            .unwrap(),
        20
    );
}

#[tokio::test]
async fn test_unbounded_query_scrapes_until_feed_stalls() {
    let mut feed = SteppedFeed {
        rendered: 0,
        step: 7,
        ceiling: 23,
    };
    let query = ScrapeQuery::new("coffee shop austin", None);
    assert_eq!(
        settle_listing_count(&mut feed, query.effective_target())
            .await
            .unwrap(),
        23
    );
}

#[tokio::test]
async fn test_feed_with_no_results_yields_zero() {
    let mut feed = SteppedFeed {
        rendered: 0,
        step: 0,
        ceiling: 0,
    };
    assert_eq!(settle_listing_count(&mut feed, usize::MAX).await.unwrap(), 0);
}
