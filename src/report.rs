use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::pipeline::EnrichedVideo;

/// Column headers of the display table, in order
pub const COLUMNS: [&str; 10] = [
    "제목",
    "채널명",
    "업로드 날짜",
    "영상 길이",
    "구독자수",
    "조회수 한글표현",
    "조회수",
    "반응도 (조회수/구독자)",
    "반응 해석",
    "영상 링크",
];

/// Appended to the sanitized query to name the CSV file
pub const CSV_SUFFIX: &str = "_reaction_top.csv";

const UTF8_BOM: &str = "\u{feff}";

/// Make a query safe to use as a file name.
///
/// Only characters that are invalid in paths are replaced; spaces and length are kept.
pub fn sanitize_filename(name: &str) -> String {
    let re = Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap();
    let sanitized = re.replace_all(name, "_");

    // A leading dot would hide the file or walk up a directory
    let result = sanitized.trim_start_matches('.');

    if result.trim().is_empty() {
        "untitled".to_string()
    } else {
        result.to_string()
    }
}

/// File name of the CSV written for a query
pub fn csv_file_name(query: &str) -> String {
    format!("{}{}", sanitize_filename(query), CSV_SUFFIX)
}

/// Presentation view of ranked videos: identifiers and raw counts left out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DisplayTable {
    pub fn from_records(records: &[EnrichedVideo]) -> Self {
        let rows = records
            .iter()
            .map(|r| {
                vec![
                    r.video.title.clone(),
                    r.video.channel_title.clone(),
                    r.video.published_at.clone(),
                    r.video.duration.clone(),
                    r.subscriber_count_formatted.clone(),
                    r.view_count_simple.clone(),
                    r.view_count_formatted.clone(),
                    format!("{:.2}", r.reaction_score),
                    r.reaction_level.label().to_string(),
                    r.url.clone(),
                ]
            })
            .collect();

        Self {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as CSV with a UTF-8 byte order mark so spreadsheets pick the right encoding
    pub fn to_csv(&self) -> String {
        let mut out = String::from(UTF8_BOM);
        push_csv_row(&mut out, &self.columns);
        for row in &self.rows {
            push_csv_row(&mut out, row);
        }
        out
    }

    /// Write `<query>_reaction_top.csv` into `dir`, replacing any earlier run
    pub fn write_csv(&self, dir: &Path, query: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(csv_file_name(query));
        fs::write(&path, self.to_csv())?;
        Ok(path)
    }
}

fn push_csv_row(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}
