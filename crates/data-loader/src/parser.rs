//! Parser for the CSV data files.
//!
//! This module handles the three input files under the data directory:
//! - activities.csv: activity_id,title,tags[,city]
//! - interactions.csv: user_id,activity_id[,event][,rating]
//! - users.csv: user_id,interests
//!
//! Columns are located by header name, so extra columns (e.g. a timestamp)
//! are ignored. Fields may be double-quoted; quoted fields can contain commas,
//! newlines and `""` escapes.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs;
use std::path::Path;

/// One parsed CSV record with the line it started on
#[derive(Debug, Clone)]
pub(crate) struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Parsed header plus records
#[derive(Debug, Clone)]
pub(crate) struct CsvTable {
    pub file: String,
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

impl CsvTable {
    /// Index of a required column
    fn column(&self, name: &str) -> Result<usize> {
        self.optional_column(name)
            .ok_or_else(|| DataLoadError::ParseError {
                file: self.file.clone(),
                line: 1,
                reason: format!("Missing column {}", name),
            })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }
}

/// Read a whole CSV file into memory
pub(crate) fn read_table(path: &Path) -> Result<CsvTable> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    parse_table(&file, &content)
}

/// Split CSV content into records
pub(crate) fn parse_table(file: &str, content: &str) -> Result<CsvTable> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.trim_start_matches('\u{feff}').chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line: record_line,
            reason: "Unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, record_line, fields);
    }

    let mut records = records.into_iter();
    let header = records
        .next()
        .map(|r| r.fields)
        .ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line: 1,
            reason: "Missing header".to_string(),
        })?;

    Ok(CsvTable {
        file: file.to_string(),
        header,
        records: records.collect(),
    })
}

fn push_record(records: &mut Vec<Record>, line: usize, fields: Vec<String>) {
    // Skip empty lines
    if fields.len() == 1 && fields[0].trim().is_empty() {
        return;
    }
    records.push(Record { line, fields });
}

/// Quote a field for writing if it needs it
pub(crate) fn format_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Fetch a field, treating a short row as an empty trailing value
fn field<'a>(record: &'a Record, column: usize) -> &'a str {
    record.fields.get(column).map(|s| s.trim()).unwrap_or("")
}

fn required_field<'a>(table: &CsvTable, record: &'a Record, column: usize, name: &str) -> Result<&'a str> {
    if column >= record.fields.len() {
        return Err(DataLoadError::FieldCountMismatch {
            expected: column + 1,
            found: record.fields.len(),
            line: record.line,
        });
    }
    let value = field(record, column);
    if value.is_empty() {
        return Err(DataLoadError::ParseError {
            file: table.file.clone(),
            line: record.line,
            reason: format!("Missing {}", name),
        });
    }
    Ok(value)
}

/// Parse the activities.csv file
///
/// Format: activity_id,title,tags[,city]
pub fn parse_activities(path: &Path) -> Result<Vec<Activity>> {
    activities_from_table(&read_table(path)?)
}

pub(crate) fn activities_from_table(table: &CsvTable) -> Result<Vec<Activity>> {
    let id_col = table.column("activity_id")?;
    let title_col = table.optional_column("title");
    let tags_col = table.optional_column("tags");
    let city_col = table.optional_column("city");

    let mut activities = Vec::with_capacity(table.records.len());
    for record in &table.records {
        let id = required_field(table, record, id_col, "activity_id")?;
        let city = city_col
            .map(|c| field(record, c))
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        activities.push(Activity {
            id: id.to_string(),
            title: title_col.map(|c| field(record, c)).unwrap_or("").to_string(),
            tags: tags_col.map(|c| field(record, c)).unwrap_or("").to_string(),
            city,
        });
    }
    Ok(activities)
}

/// Parse the interactions.csv file
///
/// Format: user_id,activity_id[,event][,rating][,liked]
///
/// A missing event column means `view`. An empty rating or liked value is
/// absent.
pub fn parse_interactions(path: &Path) -> Result<Vec<InteractionEvent>> {
    interactions_from_table(&read_table(path)?)
}

pub(crate) fn interactions_from_table(table: &CsvTable) -> Result<Vec<InteractionEvent>> {
    let user_col = table.column("user_id")?;
    let activity_col = table.column("activity_id")?;
    let event_col = table.optional_column("event");
    let rating_col = table.optional_column("rating");
    let liked_col = table.optional_column("liked");

    let mut events = Vec::with_capacity(table.records.len());
    for record in &table.records {
        let user_id = required_field(table, record, user_col, "user_id")?;
        let activity_id = required_field(table, record, activity_col, "activity_id")?;

        let event = match event_col.map(|c| field(record, c)) {
            Some(value) if !value.is_empty() => value.parse::<EventKind>()?,
            _ => EventKind::View,
        };

        let rating = match rating_col.map(|c| field(record, c)) {
            Some(value) if !value.is_empty() => Some(parse_rating(table, record, value)?),
            _ => None,
        };

        let liked = match liked_col.map(|c| field(record, c)) {
            Some(value) if !value.is_empty() => {
                Some(value.parse::<f32>().map_err(|e| DataLoadError::ParseError {
                    file: table.file.clone(),
                    line: record.line,
                    reason: format!("Invalid liked value: {}", e),
                })?)
            }
            _ => None,
        };

        events.push(InteractionEvent {
            user_id: user_id.to_string(),
            activity_id: activity_id.to_string(),
            event,
            rating,
            liked,
        });
    }
    Ok(events)
}

/// Ratings are integers 1-5, but files written by other tools store them
/// as floats ("4.0").
fn parse_rating(table: &CsvTable, record: &Record, value: &str) -> Result<u8> {
    let parsed: f32 = value.parse().map_err(|e| DataLoadError::ParseError {
        file: table.file.clone(),
        line: record.line,
        reason: format!("Invalid rating: {}", e),
    })?;
    if !(1.0..=5.0).contains(&parsed) || parsed.fract() != 0.0 {
        return Err(DataLoadError::InvalidValue {
            field: "rating".to_string(),
            value: value.to_string(),
        });
    }
    Ok(parsed as u8)
}

/// Parse the users.csv file
///
/// Format: user_id,interests
pub fn parse_profiles(path: &Path) -> Result<Vec<UserProfile>> {
    profiles_from_table(&read_table(path)?)
}

pub(crate) fn profiles_from_table(table: &CsvTable) -> Result<Vec<UserProfile>> {
    let user_col = table.column("user_id")?;
    let interests_col = table.optional_column("interests");

    let mut profiles = Vec::with_capacity(table.records.len());
    for record in &table.records {
        let user_id = required_field(table, record, user_col, "user_id")?;
        profiles.push(UserProfile {
            user_id: user_id.to_string(),
            interests: interests_col
                .map(|c| field(record, c))
                .unwrap_or("")
                .to_string(),
        });
    }
    Ok(profiles)
}
