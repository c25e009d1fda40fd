//! Result summaries
//!
//! Read-only aggregation over an enriched table, used by `analyze` and
//! printed at the end of a run.

use std::collections::BTreeMap;
use std::fmt;

use crate::table::Dataset;

pub struct Summary {
    pub total: usize,
    pub found: usize,
    pub by_confidence: BTreeMap<String, usize>,
    pub by_source: BTreeMap<String, usize>,
    pub samples: Vec<(String, String, String)>,
}

const SAMPLE_LIMIT: usize = 10;

impl Summary {
    pub fn of(dataset: &Dataset) -> Self {
        let mut by_confidence = BTreeMap::new();
        let mut by_source = BTreeMap::new();
        let mut samples = Vec::new();
        let mut found = 0;

        for row in 0..dataset.len() {
            if !dataset.has_valid_result(row) {
                continue;
            }
            found += 1;

            let confidence = dataset.confidence_cell(row).trim();
            let key = if confidence.is_empty() {
                "unspecified"
            } else {
                confidence
            };
            *by_confidence.entry(key.to_string()).or_insert(0) += 1;

            // Suffixed sources ("OpenAI - aggressive extraction") group under
            // the provider label.
            let source = dataset
                .source_cell(row)
                .split(" - ")
                .next()
                .unwrap_or("")
                .trim();
            if !source.is_empty() {
                *by_source.entry(source.to_string()).or_insert(0) += 1;
            }

            if samples.len() < SAMPLE_LIMIT {
                samples.push((
                    dataset.company_name(row).to_string(),
                    dataset.ceo_name(row).to_string(),
                    source.to_string(),
                ));
            }
        }

        Summary {
            total: dataset.len(),
            found,
            by_confidence,
            by_source,
            samples,
        }
    }

    pub fn missing(&self) -> usize {
        self.total - self.found
    }

    pub fn coverage_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.found as f64 * 100.0 / self.total as f64
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Rows: {}  found: {} ({:.1}%)  missing: {}",
            self.total,
            self.found,
            self.coverage_pct(),
            self.missing()
        )?;

        if !self.by_confidence.is_empty() {
            writeln!(f, "\nBy confidence:")?;
            for (confidence, count) in &self.by_confidence {
                writeln!(f, "  {:<12} {}", confidence, count)?;
            }
        }

        if !self.by_source.is_empty() {
            writeln!(f, "\nBy source:")?;
            for (source, count) in &self.by_source {
                writeln!(f, "  {:<24} {}", source, count)?;
            }
        }

        if !self.samples.is_empty() {
            writeln!(f, "\nSample results:")?;
            for (company, name, source) in &self.samples {
                writeln!(f, "  {} -> {} [{}]", company, name, source)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_summary_counts_and_grouping() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"company,ceo_name,ceo_title,ceo_email,ceo_linkedin,confidence,source\n\
              Acme,Jane Maxwell,CEO,,,high,Hunter.io\n\
              Globex,Omar Diaz,CEO,,,medium,OpenAI - aggressive extraction\n\
              Initech,Not found,,,,,\n",
        )
        .unwrap();
        file.flush().unwrap();

        let dataset = Dataset::load(file.path()).unwrap();
        let summary = Summary::of(&dataset);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.found, 2);
        assert_eq!(summary.missing(), 1);
        assert_eq!(summary.by_confidence.get("high"), Some(&1));
        assert_eq!(summary.by_source.get("OpenAI"), Some(&1));
        assert_eq!(summary.samples.len(), 2);

        let text = summary.to_string();
        assert!(text.contains("found: 2 (66.7%)"));
        assert!(text.contains("Hunter.io"));
    }
}
