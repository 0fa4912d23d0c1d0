use serde::{Deserialize, Serialize};

mod export;
pub use export::{export_stem, Exporter};

pub type Result<T> = std::result::Result<T, MapgrabError>;

#[derive(Debug, thiserror::Error)]
pub enum MapgrabError {
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
    #[error("Scraping error: {0}")]
    Scraping(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("no search terms: pass --search or add queries to the input file")]
    NoSearchTerms,
}

/// One scraped business listing. Optional fields are `None` when the
/// corresponding element was not present in the detail panel; coordinates are
/// always populated because they come from the detail page URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub name: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub phone_number: Option<String>,
    pub reviews_count: Option<u64>,
    pub reviews_average: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Business {
    /// Flattened column names, in field declaration order. Both exporters
    /// write exactly these columns in exactly this order.
    pub const COLUMNS: [&'static str; 8] = [
        "name",
        "address",
        "website",
        "phone_number",
        "reviews_count",
        "reviews_average",
        "latitude",
        "longitude",
    ];

    /// Flattens the record into one cell per column; absent fields become
    /// empty cells.
    pub fn to_row(&self) -> [String; 8] {
        [
            self.name.clone().unwrap_or_default(),
            self.address.clone().unwrap_or_default(),
            self.website.clone().unwrap_or_default(),
            self.phone_number.clone().unwrap_or_default(),
            self.reviews_count.map(|c| c.to_string()).unwrap_or_default(),
            self.reviews_average.map(|a| a.to_string()).unwrap_or_default(),
            self.latitude.to_string(),
            self.longitude.to_string(),
        ]
    }
}

/// Ordered collection of records for a single search query. Created empty per
/// query, appended to by the scraper, exported once, then discarded.
#[derive(Debug, Default)]
pub struct BusinessList {
    businesses: Vec<Business>,
}

impl BusinessList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, business: Business) {
        self.businesses.push(business);
    }

    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Business> {
        self.businesses.iter()
    }
}

impl FromIterator<Business> for BusinessList {
    fn from_iter<I: IntoIterator<Item = Business>>(iter: I) -> Self {
        Self {
            businesses: iter.into_iter().collect(),
        }
    }
}
