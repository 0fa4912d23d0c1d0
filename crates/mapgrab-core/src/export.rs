use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::{Business, BusinessList, Result};

/// File stem for one query's output artifacts: a fixed prefix plus the query
/// with spaces replaced by underscores.
pub fn export_stem(query: &str) -> String {
    format!("google_maps_data_{}", query.trim()).replace(' ', "_")
}

/// Writes a `BusinessList` as a spreadsheet and a CSV file under one output
/// directory. Both artifacts carry the same header row, the same column
/// order and the same row content; existing files are overwritten.
#[derive(Debug, Clone)]
pub struct Exporter {
    out_dir: PathBuf,
}

impl Exporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Writes `<stem>.xlsx` and `<stem>.csv`, creating the output directory
    /// if it does not exist. Returns the two file paths.
    pub fn save(&self, list: &BusinessList, stem: &str) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(&self.out_dir)?;

        let xlsx_path = self.out_dir.join(format!("{}.xlsx", stem));
        let csv_path = self.out_dir.join(format!("{}.csv", stem));

        self.save_xlsx(list, &xlsx_path)?;
        self.save_csv(list, &csv_path)?;

        debug!("exported {} records to {:?} and {:?}", list.len(), xlsx_path, csv_path);
        Ok((xlsx_path, csv_path))
    }

    fn save_csv(&self, list: &BusinessList, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(Business::COLUMNS)?;
        for business in list.iter() {
            writer.write_record(business.to_row())?;
        }
        writer.flush()?;
        Ok(())
    }

    fn save_xlsx(&self, list: &BusinessList, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, name) in Business::COLUMNS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *name)?;
        }

        for (i, business) in list.iter().enumerate() {
            let row = i as u32 + 1;
            if let Some(name) = &business.name {
                worksheet.write_string(row, 0, name)?;
            }
            if let Some(address) = &business.address {
                worksheet.write_string(row, 1, address)?;
            }
            if let Some(website) = &business.website {
                worksheet.write_string(row, 2, website)?;
            }
            if let Some(phone) = &business.phone_number {
                worksheet.write_string(row, 3, phone)?;
            }
            if let Some(count) = business.reviews_count {
                worksheet.write_number(row, 4, count as f64)?;
            }
            if let Some(average) = business.reviews_average {
                worksheet.write_number(row, 5, average)?;
            }
            worksheet.write_number(row, 6, business.latitude)?;
            worksheet.write_number(row, 7, business.longitude)?;
        }

        workbook.save(path)?;
        Ok(())
    }
}
