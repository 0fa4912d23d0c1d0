use std::time::Duration;

use async_trait::async_trait;
use mapgrab_core::{Business, BusinessList, MapgrabError, Result};
use thirtyfour::error::WebDriverError;
use thirtyfour::{By, ChromiumLikeCapabilities, DesiredCapabilities, Key, WebDriver, WebElement};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::{settle_listing_count, ListingFeed, ScrapeQuery, WaitConfig};

const MAPS_URL: &str = "https://www.google.com/maps";

const SEARCH_INPUT_XPATH: &str = r#"//input[@id="searchboxinput"]"#;
const PLACE_ANCHOR_XPATH: &str = r#"//a[contains(@href, "https://www.google.com/maps/place")]"#;

const NAME_CSS: &str = ".DUwDvf.lfPIob";
const ADDRESS_XPATH: &str =
    r#"//button[@data-item-id="address"]//div[contains(@class, "fontBodyMedium")]"#;
const WEBSITE_XPATH: &str =
    r#"//a[@data-item-id="authority"]//div[contains(@class, "fontBodyMedium")]"#;
const PHONE_XPATH: &str =
    r#"//button[contains(@data-item-id, "phone:tel:")]//div[contains(@class, "fontBodyMedium")]"#;
const REVIEW_COUNT_XPATH: &str = r#"//button[@jsaction="pane.reviewChart.moreReviews"]//span"#;
const REVIEW_AVERAGE_XPATH: &str =
    r#"//div[@jsaction="pane.reviewChart.moreReviews"]//div[@role="img"]"#;

// The results panel is the element that has to scroll, not the window.
const SCROLL_FEED_JS: &str = r#"
    const feed = document.querySelector('div[role="feed"]');
    if (feed) { feed.scrollBy(0, 10000); } else { window.scrollBy(0, 10000); }
"#;

/// What one query produced: the records that survived extraction and how
/// many listings were dropped by the per-listing failure boundary.
#[derive(Debug)]
pub struct ScrapeReport {
    pub records: BusinessList,
    pub skipped: usize,
}

/// A live WebDriver session pointed at Google Maps. One session serves all
/// queries of a run; each query gets a fresh [`BusinessList`].
pub struct GoogleMapsScraper {
    driver: WebDriver,
    waits: WaitConfig,
}

impl GoogleMapsScraper {
    /// Connects to the WebDriver endpoint, opens Google Maps and waits for
    /// the UI to settle.
    pub async fn connect(webdriver_url: &str, headless: bool, waits: WaitConfig) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if headless {
            caps.set_headless()?;
        }

        let driver = WebDriver::new(webdriver_url, caps).await?;
        driver.set_page_load_timeout(waits.page_load_timeout).await?;
        driver.maximize_window().await?;

        driver.goto(MAPS_URL).await?;
        sleep(waits.search_settle).await;

        Ok(Self { driver, waits })
    }

    /// Runs one query end to end: submit the search, grow the results feed,
    /// then open and extract every kept listing. Listings that fail
    /// extraction are logged and dropped; everything else keeps going.
    pub async fn scrape(&self, query: &ScrapeQuery) -> Result<ScrapeReport> {
        self.submit_search(&query.search).await?;

        // Hover the first anchor so scroll events land on the results feed.
        if let Some(first) = self.optional_find(By::XPath(PLACE_ANCHOR_XPATH)).await? {
            self.driver
                .action_chain()
                .move_to_element_center(&first)
                .perform()
                .await?;
        }

        let keep = {
            let mut feed = ResultsFeed {
                driver: &self.driver,
                settle: self.waits.scroll_settle,
            };
            settle_listing_count(&mut feed, query.effective_target()).await?
        };

        let anchors = self.driver.find_all(By::XPath(PLACE_ANCHOR_XPATH)).await?;
        let anchors = &anchors[..keep.min(anchors.len())];
        info!("total scraped: {}", anchors.len());

        let mut records = BusinessList::new();
        let mut skipped = 0;
        for anchor in anchors {
            match self.open_and_extract(anchor).await {
                Ok(business) => records.push(business),
                Err(e) => {
                    warn!("skipping listing: {}", e);
                    skipped += 1;
                }
            }
        }

        Ok(ScrapeReport { records, skipped })
    }

    /// Shuts the browser session down.
    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }

    async fn submit_search(&self, search: &str) -> Result<()> {
        let input = self.driver.find(By::XPath(SEARCH_INPUT_XPATH)).await?;
        input.clear().await?;
        input.send_keys(search).await?;
        sleep(self.waits.search_fill).await;

        input.send_keys(String::from(char::from(Key::Enter))).await?;
        sleep(self.waits.search_settle).await;
        Ok(())
    }

    /// Per-listing boundary: any error in here drops only this listing.
    async fn open_and_extract(&self, anchor: &WebElement) -> Result<Business> {
        // The clickable card is the anchor's enclosing container.
        let container = anchor.find(By::XPath("./..")).await?;
        container.click().await?;
        self.wait_for_detail_panel().await?;

        let mut business = Business {
            name: self.optional_text(By::Css(NAME_CSS)).await?,
            address: self.optional_text(By::XPath(ADDRESS_XPATH)).await?,
            website: self
                .optional_text(By::XPath(WEBSITE_XPATH))
                .await?
                .map(|label| format!("https://www.{}", label)),
            phone_number: self.optional_text(By::XPath(PHONE_XPATH)).await?,
            ..Business::default()
        };

        if let Some(text) = self.optional_text(By::XPath(REVIEW_COUNT_XPATH)).await? {
            if !text.trim().is_empty() {
                business.reviews_count = Some(parse_review_count(&text)?);
            }
        }

        if let Some(element) = self.optional_find(By::XPath(REVIEW_AVERAGE_XPATH)).await? {
            if let Some(label) = element.attr("aria-label").await? {
                business.reviews_average = review_average_from_label(&label)?;
            }
        }

        let url = self.driver.current_url().await?;
        let (latitude, longitude) = parse_coordinates(url.as_str())?;
        business.latitude = latitude;
        business.longitude = longitude;

        Ok(business)
    }

    /// Polls for the detail heading after a click instead of sleeping a fixed
    /// interval. Timing out is not an error: extraction runs against whatever
    /// is rendered, and field lookups handle absence.
    async fn wait_for_detail_panel(&self) -> Result<()> {
        let deadline = Instant::now() + self.waits.detail_timeout;
        loop {
            sleep(self.waits.detail_poll).await;
            if self.optional_find(By::Css(NAME_CSS)).await?.is_some() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                debug!("detail heading not rendered within timeout, extracting anyway");
                return Ok(());
            }
        }
    }

    async fn optional_find(&self, by: By) -> Result<Option<WebElement>> {
        match self.driver.find(by).await {
            Ok(element) => Ok(Some(element)),
            Err(WebDriverError::NoSuchElement(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn optional_text(&self, by: By) -> Result<Option<String>> {
        match self.optional_find(by).await? {
            Some(element) => Ok(Some(element.text().await?)),
            None => Ok(None),
        }
    }
}

/// [`ListingFeed`] over the live results panel: one scroll, one settle, one
/// anchor count.
struct ResultsFeed<'a> {
    driver: &'a WebDriver,
    settle: Duration,
}

#[async_trait]
impl ListingFeed for ResultsFeed<'_> {
    async fn load_more(&mut self) -> Result<usize> {
        self.driver.execute(SCROLL_FEED_JS, Vec::new()).await?;
        sleep(self.settle).await;
        let anchors = self.driver.find_all(By::XPath(PLACE_ANCHOR_XPATH)).await?;
        Ok(anchors.len())
    }
}

/// Parses a review count like `"1,234 reviews"`. Thousand separators are
/// stripped; anything else malformed is an error that aborts the listing.
pub fn parse_review_count(text: &str) -> Result<u64> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| MapgrabError::Scraping(format!("empty review count text: {:?}", text)))?;
    token
        .replace(',', "")
        .parse()
        .map_err(|_| MapgrabError::Scraping(format!("malformed review count: {:?}", text)))
}

/// Review average from the chart's accessibility label. An empty label means
/// the field is absent, same as a missing element; only non-empty text that
/// fails to parse is a listing-level error.
fn review_average_from_label(label: &str) -> Result<Option<f64>> {
    if label.trim().is_empty() {
        return Ok(None);
    }
    parse_review_average(label).map(Some)
}

/// Parses a rating from an accessibility label like `"4,5 stars"`. Locales
/// that use a decimal comma are normalized to a decimal point.
pub fn parse_review_average(label: &str) -> Result<f64> {
    let token = label
        .split_whitespace()
        .next()
        .ok_or_else(|| MapgrabError::Scraping(format!("empty review average label: {:?}", label)))?;
    token
        .replace(',', ".")
        .parse()
        .map_err(|_| MapgrabError::Scraping(format!("malformed review average: {:?}", label)))
}

/// Extracts `(latitude, longitude)` from a Maps detail URL, which carries a
/// `/@lat,lon,zoom` segment. A missing or malformed segment is a hard
/// failure for the listing.
pub fn parse_coordinates(url: &str) -> Result<(f64, f64)> {
    let (_, rest) = url
        .rsplit_once("/@")
        .ok_or_else(|| MapgrabError::Scraping(format!("no coordinate segment in url: {}", url)))?;
    let segment = rest.split('/').next().unwrap_or(rest);

    let mut parts = segment.split(',');
    let latitude = parts
        .next()
        .and_then(|p| p.parse::<f64>().ok())
        .ok_or_else(|| MapgrabError::Scraping(format!("malformed latitude in url: {}", url)))?;
    let longitude = parts
        .next()
        .and_then(|p| p.parse::<f64>().ok())
        .ok_or_else(|| MapgrabError::Scraping(format!("malformed longitude in url: {}", url)))?;

    Ok((latitude, longitude))
}
