//! Reference store reader.
//!
//! The store is a pipe-delimited UTF-8 table plus a directory of images.
//! Pipe is used instead of comma so the free-text performance narratives
//! can contain commas unquoted. A field is quote-wrapped when it contains
//! embedded newlines or pipes; a doubled quote inside a quoted field is a
//! literal quote.
//!
//! Expected header: `image_filename|performance_info` (extra columns are
//! tolerated and ignored).
//!
//! The table and images are read fresh on every call — no caching across
//! requests, so concurrent pipeline instances never share mutable state.

use shotscore_core::error::ContextError;
use shotscore_core::review::ReferenceExample;
use std::path::{Path, PathBuf};
use tracing::warn;

const COL_FILENAME: &str = "image_filename";
const COL_PERFORMANCE: &str = "performance_info";

/// Reads reference examples from a configured table and image directory.
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    table_path: PathBuf,
    image_dir: PathBuf,
    max_examples: usize,
}

impl ReferenceStore {
    pub fn new(
        table_path: impl Into<PathBuf>,
        image_dir: impl Into<PathBuf>,
        max_examples: usize,
    ) -> Self {
        Self {
            table_path: table_path.into(),
            image_dir: image_dir.into(),
            max_examples,
        }
    }

    /// Load up to `max_examples` reference examples, in table row order.
    ///
    /// A missing or malformed table is fatal. A row whose image file is
    /// absent (or unreadable) is skipped with a warning; the remaining
    /// rows are still processed.
    pub fn load(&self) -> Result<Vec<ReferenceExample>, ContextError> {
        if !self.table_path.exists() {
            return Err(ContextError::TableMissing {
                path: self.table_path.clone(),
            });
        }

        let content =
            std::fs::read_to_string(&self.table_path).map_err(|e| ContextError::TableUnreadable {
                path: self.table_path.clone(),
                reason: e.to_string(),
            })?;

        let records = parse_pipe_table(&content).map_err(|reason| ContextError::TableMalformed {
            path: self.table_path.clone(),
            reason,
        })?;

        let mut rows = records.into_iter();
        let header = rows.next().ok_or_else(|| ContextError::TableMalformed {
            path: self.table_path.clone(),
            reason: "table has no header row".into(),
        })?;

        let filename_idx = column_index(&header, COL_FILENAME).ok_or_else(|| {
            ContextError::TableMalformed {
                path: self.table_path.clone(),
                reason: format!("header is missing the '{COL_FILENAME}' column"),
            }
        })?;
        let performance_idx = column_index(&header, COL_PERFORMANCE).ok_or_else(|| {
            ContextError::TableMalformed {
                path: self.table_path.clone(),
                reason: format!("header is missing the '{COL_PERFORMANCE}' column"),
            }
        })?;

        let mut examples = Vec::new();
        for record in rows {
            if examples.len() >= self.max_examples {
                break;
            }
            // Blank trailing lines parse as a single empty field
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }

            let Some(filename) = record.get(filename_idx).map(|s| s.trim()) else {
                warn!(row = ?record, "Reference row too short, skipping");
                continue;
            };
            let performance_text = record
                .get(performance_idx)
                .map(|s| s.as_str())
                .unwrap_or_default();

            if filename.is_empty() {
                warn!("Reference row has empty image_filename, skipping");
                continue;
            }
            // The identifier must resolve inside the reference directory
            if filename.contains('/') || filename.contains('\\') {
                warn!(filename, "Reference filename contains a path separator, skipping");
                continue;
            }

            let image_path = self.image_dir.join(filename);
            let image_bytes = match std::fs::read(&image_path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(
                        path = %image_path.display(),
                        error = %e,
                        "Reference image not readable, skipping row"
                    );
                    continue;
                }
            };

            examples.push(ReferenceExample {
                identifier: filename.to_string(),
                performance_text: performance_text.to_string(),
                image_bytes,
            });
        }

        Ok(examples)
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }
}

fn column_index(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|h| h.trim() == name)
}

/// Parse pipe-delimited text into records of fields.
///
/// Quote handling: a field starting with `"` runs until the closing
/// quote, swallowing pipes and newlines; `""` inside it is a literal
/// quote. Everything else splits on `|` and line breaks.
fn parse_pipe_table(content: &str) -> Result<Vec<Vec<String>>, String> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;

    let mut chars = content.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' if !field_started => {
                in_quotes = true;
                field_started = true;
            }
            '|' => {
                record.push(std::mem::take(&mut field));
                field_started = false;
            }
            '\r' => {} // swallowed; \n terminates the record
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                field_started = false;
            }
            _ => {
                field.push(ch);
                field_started = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".into());
    }
    if field_started || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Minimal valid PNG header so sniffing elsewhere stays honest.
    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01];

    struct Fixture {
        _dir: tempfile::TempDir,
        table: PathBuf,
        images: PathBuf,
    }

    fn fixture(table_content: &str, image_names: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("references");
        fs::create_dir(&images).unwrap();
        for name in image_names {
            fs::write(images.join(name), PNG_BYTES).unwrap();
        }
        let table = dir.path().join("performance.psv");
        fs::write(&table, table_content).unwrap();
        Fixture {
            _dir: dir,
            table,
            images,
        }
    }

    #[test]
    fn loads_rows_in_table_order() {
        let f = fixture(
            "image_filename|performance_info\na.png|First shot\nb.png|Second shot\n",
            &["a.png", "b.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 10);
        let examples = store.load().unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].identifier, "a.png");
        assert_eq!(examples[0].performance_text, "First shot");
        assert_eq!(examples[1].identifier, "b.png");
    }

    #[test]
    fn truncates_to_max_examples() {
        let f = fixture(
            "image_filename|performance_info\na.png|A\nb.png|B\nc.png|C\n",
            &["a.png", "b.png", "c.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 2);
        let examples = store.load().unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].identifier, "a.png");
        assert_eq!(examples[1].identifier, "b.png");
    }

    #[test]
    fn missing_image_skipped_not_fatal() {
        let f = fixture(
            "image_filename|performance_info\na.png|A\nmissing.png|gone\nc.png|C\n",
            &["a.png", "c.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 10);
        let examples = store.load().unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[1].identifier, "c.png");
    }

    #[test]
    fn missing_table_is_fatal() {
        let f = fixture("image_filename|performance_info\n", &[]);
        let store = ReferenceStore::new(f.table.with_extension("nope"), &f.images, 3);
        assert!(matches!(
            store.load(),
            Err(ContextError::TableMissing { .. })
        ));
    }

    #[test]
    fn missing_required_column_is_malformed() {
        let f = fixture("image_filename|notes\na.png|A\n", &["a.png"]);
        let store = ReferenceStore::new(&f.table, &f.images, 3);
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("performance_info"));
    }

    #[test]
    fn quoted_field_round_trip() {
        // Quotes stripped, content preserved verbatim including punctuation.
        let f = fixture(
            "image_filename|performance_info\nsample.png|\"Contrast is high.\"\n",
            &["sample.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 3);
        let examples = store.load().unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].performance_text, "Contrast is high.");
    }

    #[test]
    fn quoted_field_with_embedded_newline() {
        let f = fixture(
            "image_filename|performance_info\na.png|\"Line one.\nLine two, with commas.\"\n",
            &["a.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 3);
        let examples = store.load().unwrap();
        assert_eq!(
            examples[0].performance_text,
            "Line one.\nLine two, with commas."
        );
    }

    #[test]
    fn doubled_quote_is_literal() {
        let f = fixture(
            "image_filename|performance_info\na.png|\"She said \"\"wow\"\".\"\n",
            &["a.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 3);
        let examples = store.load().unwrap();
        assert_eq!(examples[0].performance_text, "She said \"wow\".");
    }

    #[test]
    fn zero_max_examples_yields_empty() {
        let f = fixture(
            "image_filename|performance_info\na.png|A\n",
            &["a.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 0);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn empty_table_yields_empty() {
        let f = fixture("image_filename|performance_info\n", &[]);
        let store = ReferenceStore::new(&f.table, &f.images, 3);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn unterminated_quote_is_malformed() {
        let f = fixture(
            "image_filename|performance_info\na.png|\"never closed\n",
            &["a.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 3);
        assert!(matches!(
            store.load(),
            Err(ContextError::TableMalformed { .. })
        ));
    }

    #[test]
    fn path_separator_in_filename_skipped() {
        let f = fixture(
            "image_filename|performance_info\n../evil.png|bad\na.png|good\n",
            &["a.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 3);
        let examples = store.load().unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].identifier, "a.png");
    }

    #[test]
    fn crlf_line_endings_accepted() {
        let f = fixture(
            "image_filename|performance_info\r\na.png|Crisp focus\r\n",
            &["a.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 3);
        let examples = store.load().unwrap();
        assert_eq!(examples[0].performance_text, "Crisp focus");
    }

    #[test]
    fn missing_final_newline_accepted() {
        let f = fixture(
            "image_filename|performance_info\na.png|No trailing newline",
            &["a.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 3);
        let examples = store.load().unwrap();
        assert_eq!(examples[0].performance_text, "No trailing newline");
    }

    #[test]
    fn extra_columns_tolerated() {
        let f = fixture(
            "shot_date|image_filename|performance_info\n2024-01-01|a.png|Fine\n",
            &["a.png"],
        );
        let store = ReferenceStore::new(&f.table, &f.images, 3);
        let examples = store.load().unwrap();
        assert_eq!(examples[0].identifier, "a.png");
        assert_eq!(examples[0].performance_text, "Fine");
    }
}
