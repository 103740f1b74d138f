use std::collections::HashSet;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use crate::{application::services::TabularSource, domain::DomainError};

const REVIEWER_FIELDS: [&str; 4] = ["reviewer", "name", "user", "author"];
const REVIEW_TEXT_FIELDS: [&str; 5] = ["review", "comment", "feedback", "text", "description"];
const MAX_SEARCH_RESULTS: usize = 100;

/// In-memory copy of a headed CSV file. Empty cells are treated as missing.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    text_columns: Vec<usize>,
}

impl CsvDataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DomainError::not_found(format!(
                "CSV file {} does not exist",
                path.display()
            )));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|err| DomainError::dataset(format!("failed to open {}: {err}", path.display())))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|err| DomainError::dataset(format!("failed to read CSV header: {err}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|err| {
                DomainError::dataset(format!("failed to parse CSV row {}: {err}", index + 1))
            })?;
            let row = (0..headers.len())
                .map(|col| {
                    record
                        .get(col)
                        .filter(|cell| !cell.is_empty())
                        .map(str::to_string)
                })
                .collect();
            rows.push(row);
        }

        let dataset = Self::from_parts(path.to_path_buf(), headers, rows);
        info!(
            path = %dataset.path.display(),
            rows = dataset.len(),
            columns = dataset.headers.len(),
            "loaded CSV dataset"
        );
        Ok(dataset)
    }

    /// A dataset with no rows, used when the source cannot be loaded.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::from_parts(path.into(), Vec::new(), Vec::new())
    }

    fn from_parts(path: PathBuf, headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let text_columns = (0..headers.len())
            .filter(|&col| {
                rows.iter()
                    .filter_map(|row| row[col].as_deref())
                    .any(|cell| cell.parse::<f64>().is_err())
            })
            .collect();

        Self {
            path,
            headers,
            rows,
            text_columns,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Names of the columns holding at least one non-numeric value.
    pub fn text_columns(&self) -> Vec<&str> {
        self.text_columns
            .iter()
            .map(|&col| self.headers[col].as_str())
            .collect()
    }

    fn cell<'a>(&'a self, row: &'a [Option<String>], field: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .position(|header| header == field)
            .and_then(|col| row[col].as_deref())
    }

    /// Renders one row as a review-like line: reviewer, review text, then
    /// every other populated column, joined by ` | `.
    pub fn format_row(&self, index: usize) -> Option<String> {
        let row = self.rows.get(index)?;
        let mut parts = Vec::new();

        if let Some(reviewer) = REVIEWER_FIELDS
            .iter()
            .find_map(|field| self.cell(row, field))
        {
            parts.push(format!("Reviewer: {reviewer}"));
        }

        if let Some(review) = REVIEW_TEXT_FIELDS
            .iter()
            .find_map(|field| self.cell(row, field))
        {
            parts.push(format!("Review: {review}"));
        }

        for (header, value) in self.headers.iter().zip(row) {
            let Some(value) = value else { continue };
            let name = header.as_str();
            if REVIEWER_FIELDS.contains(&name) || REVIEW_TEXT_FIELDS.contains(&name) {
                continue;
            }
            parts.push(format!("{}: {value}", title_case(&name.replace('_', " "))));
        }

        Some(parts.join(" | "))
    }

    /// Every row rendered as review text, skipping rows that render empty.
    pub fn review_texts(&self) -> Vec<String> {
        (0..self.rows.len())
            .filter_map(|index| self.format_row(index))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Case-insensitive substring search over the text columns.
    pub fn search(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || self.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut results = Vec::new();

        'columns: for &col in &self.text_columns {
            for (index, row) in self.rows.iter().enumerate() {
                let matches = row[col]
                    .as_deref()
                    .is_some_and(|cell| cell.to_lowercase().contains(&needle));
                if !matches {
                    continue;
                }
                if let Some(text) = self.format_row(index) {
                    if seen.insert(text.clone()) {
                        results.push(text);
                        if results.len() >= MAX_SEARCH_RESULTS {
                            break 'columns;
                        }
                    }
                }
            }
        }

        debug!(query, hits = results.len(), "csv keyword search");
        results
    }
}

impl TabularSource for CsvDataset {
    fn search(&self, query: &str) -> Vec<String> {
        CsvDataset::search(self, query)
    }

    fn row_count(&self) -> usize {
        self.len()
    }
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_alpha = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(ch);
            previous_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn rows_render_reviewer_review_and_other_fields() {
        let file = write_csv(
            "name,review,star_rating,product_TYPE\n\
             Ana,Love the e-bike,5,E-Bike\n\
             ,Too heavy,2,\n",
        );
        let dataset = CsvDataset::load(file.path()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.format_row(0).unwrap(),
            "Reviewer: Ana | Review: Love the e-bike | Star Rating: 5 | Product Type: E-Bike"
        );
        assert_eq!(
            dataset.format_row(1).unwrap(),
            "Review: Too heavy | Star Rating: 2"
        );
    }

    #[test]
    fn reviewer_priority_follows_field_order() {
        let file = write_csv("author,user,comment\nAuthorName,UserName,ok\n");
        let dataset = CsvDataset::load(file.path()).unwrap();
        assert_eq!(
            dataset.format_row(0).unwrap(),
            "Reviewer: UserName | Review: ok"
        );
    }

    #[test]
    fn numeric_columns_are_not_text_columns() {
        let file = write_csv("age,city,score\n31,Berlin,\n45,Paris,3.5\n");
        let dataset = CsvDataset::load(file.path()).unwrap();
        assert_eq!(dataset.text_columns(), vec!["city"]);
    }

    #[test]
    fn search_is_case_insensitive_deduplicated_and_scoped_to_text() {
        let file = write_csv(
            "review,product,age\n\
             great commuter bike,E-Bike,30\n\
             great commuter bike,E-Bike,30\n\
             not for me,Scooter,30\n",
        );
        let dataset = CsvDataset::load(file.path()).unwrap();

        let hits = dataset.search("e-BIKE");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].contains("Review: great commuter bike"));

        assert!(dataset.search("30").is_empty());
        assert!(dataset.search("   ").is_empty());
    }

    #[test]
    fn empty_rows_are_skipped_from_review_texts() {
        let file = write_csv("review,rating\n,\nsolid,4\n");
        let dataset = CsvDataset::load(file.path()).unwrap();
        assert_eq!(dataset.review_texts(), vec!["Review: solid | Rating: 4"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = CsvDataset::load("/definitely/missing.csv").unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(CsvDataset::empty("missing.csv").search("x").is_empty());
    }

    #[test]
    fn title_case_matches_word_runs() {
        assert_eq!(title_case("purchase date"), "Purchase Date");
        assert_eq!(title_case("eBIKE model2go"), "Ebike Model2Go");
    }
}
