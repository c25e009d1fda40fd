//! CSV company table
//!
//! The table is loaded whole, enriched in place, and written back atomically.
//! Original columns are preserved untouched; the six result columns are
//! appended on first load if absent. Column detection is heuristic because
//! input files come from many CRM exports with inconsistent headers.

use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::extract;
use crate::sources::{CeoRecord, CompanyQuery};
use crate::util;

/// Result columns appended to the table, in output order.
pub const RESULT_COLUMNS: &[&str] = &[
    "ceo_name",
    "ceo_title",
    "ceo_email",
    "ceo_linkedin",
    "confidence",
    "source",
];

const COMPANY_HEADERS: &[&str] = &["company", "business", "organization", "organisation", "firm"];
const WEBSITE_HEADERS: &[&str] = &["website", "web", "url", "domain", "site"];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no company column found in headers: {headers:?}")]
    MissingCompanyColumn { headers: Vec<String> },
    #[error("{path} has no data rows")]
    Empty { path: PathBuf },
}

#[derive(Debug)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    company_idx: usize,
    website_idx: Option<usize>,
    linkedin_idx: Option<usize>,
    // index of each RESULT_COLUMNS entry, same order
    result_idx: Vec<usize>,
}

fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let lower = h.to_lowercase();
        candidates.iter().any(|c| lower.contains(c))
    })
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|source| DatasetError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut headers: Vec<String> = reader
            .headers()
            .map_err(|source| DatasetError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| DatasetError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }
        if rows.is_empty() {
            return Err(DatasetError::Empty {
                path: path.to_path_buf(),
            });
        }

        let company_idx = find_column(&headers, COMPANY_HEADERS)
            .or_else(|| headers.iter().position(|h| h.to_lowercase() == "name"))
            .ok_or_else(|| DatasetError::MissingCompanyColumn {
                headers: headers.clone(),
            })?;
        let website_idx = find_column(&headers, WEBSITE_HEADERS);
        let linkedin_idx = find_column(&headers, &["linkedin"]);

        // Append any result column not already present, then pad every row
        // out to the full header width.
        let mut result_idx = Vec::with_capacity(RESULT_COLUMNS.len());
        for column in RESULT_COLUMNS {
            let idx = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(column))
                .unwrap_or_else(|| {
                    headers.push(column.to_string());
                    headers.len() - 1
                });
            result_idx.push(idx);
        }
        for row in &mut rows {
            row.resize(headers.len(), String::new());
        }

        debug!(
            "Loaded {} rows; company column {:?}, website {:?}",
            rows.len(),
            headers[company_idx],
            website_idx.map(|i| headers[i].as_str())
        );

        Ok(Self {
            headers,
            rows,
            company_idx,
            website_idx,
            linkedin_idx,
            result_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn company_name(&self, row: usize) -> &str {
        self.rows[row][self.company_idx].trim()
    }

    /// Lookup inputs for one row. Returns None for a blank company cell.
    pub fn query(&self, row: usize) -> Option<CompanyQuery> {
        let name = self.company_name(row);
        if name.is_empty() || name.eq_ignore_ascii_case("nan") {
            return None;
        }

        let mut query = CompanyQuery::new(name);
        if let Some(idx) = self.website_idx {
            if let Some(url) = util::clean_url(&self.rows[row][idx]) {
                query = query.with_website(url);
            }
        }
        if let Some(idx) = self.linkedin_idx {
            if let Some(url) = util::clean_url(&self.rows[row][idx]) {
                query = query.with_linkedin(url);
            }
        }
        Some(query)
    }

    fn result_cell(&self, row: usize, column: usize) -> &str {
        &self.rows[row][self.result_idx[column]]
    }

    pub fn ceo_name(&self, row: usize) -> &str {
        self.result_cell(row, 0)
    }

    pub fn confidence_cell(&self, row: usize) -> &str {
        self.result_cell(row, 4)
    }

    pub fn source_cell(&self, row: usize) -> &str {
        self.result_cell(row, 5)
    }

    /// Does this row already hold a usable result?
    pub fn has_valid_result(&self, row: usize) -> bool {
        extract::is_valid_name(self.ceo_name(row))
    }

    /// Has this row been attempted at all (result or placeholder)?
    pub fn has_any_result(&self, row: usize) -> bool {
        !self.ceo_name(row).trim().is_empty()
    }

    pub fn apply(&mut self, row: usize, record: &CeoRecord) {
        let values = [
            record.name.clone(),
            record.title.clone(),
            record.email.clone(),
            record.linkedin.clone(),
            record.confidence.to_string(),
            record.source.clone(),
        ];
        for (column, value) in values.into_iter().enumerate() {
            self.rows[row][self.result_idx[column]] = value;
        }
    }

    /// Record an exhausted lookup so resume passes can tell "attempted and
    /// missed" from "never attempted".
    pub fn mark_not_found(&mut self, row: usize) {
        self.rows[row][self.result_idx[0]] = "Not found".to_string();
        for column in 1..RESULT_COLUMNS.len() {
            self.rows[row][self.result_idx[column]] = String::new();
        }
    }

    pub fn set_linkedin(&mut self, row: usize, url: impl Into<String>) {
        self.rows[row][self.result_idx[3]] = url.into();
    }

    pub fn linkedin_cell(&self, row: usize) -> &str {
        self.result_cell(row, 3)
    }

    /// Write the table to a temp file next to the target, then rename over
    /// it, so a crash mid-write never truncates previous progress.
    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        let tmp = path.with_extension("csv.tmp");

        let mut writer = WriterBuilder::new()
            .from_path(&tmp)
            .map_err(|source| DatasetError::Write {
                path: tmp.clone(),
                source: std::io::Error::other(source),
            })?;
        let write_err = |source: csv::Error| DatasetError::Write {
            path: tmp.clone(),
            source: std::io::Error::other(source),
        };

        writer.write_record(&self.headers).map_err(write_err)?;
        for row in &self.rows {
            writer.write_record(row).map_err(write_err)?;
        }
        writer
            .flush()
            .map_err(|source| DatasetError::Write {
                path: tmp.clone(),
                source,
            })?;
        drop(writer);

        fs::rename(&tmp, path).map_err(|source| DatasetError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Saved {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}
