// # CSV Address Source
//
// This crate provides a CSV file address source for zonesync.
//
// ## File Format
//
// ```text
// ip,comment
// 1.1.1.1,primary
// 2.2.2.2,backup
// ```
//
// - The first non-blank line is a header and is skipped
// - Blank lines are skipped
// - The leading field of each following row is the address, trimmed and
//   unquoted
// - A quoted field may span lines; rows end only at newlines outside quotes
// - Only the first `limit` rows are read, in file order
//
// ## Failure Modes
//
// A missing or unreadable file, or a row with an empty leading field, is an
// `Error::AddressSource`. A file with only a header yields an empty list;
// whether that is acceptable is decided by the engine.

use async_trait::async_trait;
use zonesync_core::config::AddressSourceConfig;
use zonesync_core::traits::{AddressList, AddressSource, AddressSourceFactory};
use zonesync_core::{Error, PluginRegistry, Result};

/// Address source type name used in configuration and the registry
pub const SOURCE_NAME: &str = "csv";

/// CSV file address source
///
/// The reference passed to [`AddressSource::read`] is a file path, relative
/// to the working directory unless absolute.
#[derive(Debug, Default)]
pub struct CsvAddressSource;

impl CsvAddressSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AddressSource for CsvAddressSource {
    async fn read(&self, reference: &str, limit: usize) -> Result<AddressList> {
        let content = tokio::fs::read_to_string(reference)
            .await
            .map_err(|e| Error::address_source(format!("Failed to read {}: {}", reference, e)))?;

        let addresses = parse_addresses(&content, limit)
            .map_err(|e| Error::address_source(format!("{}: {}", reference, e)))?;

        tracing::debug!("Read {} address(es) from {}", addresses.len(), reference);
        Ok(AddressList::from(addresses))
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }
}

/// Extract the leading field of the first `limit` data rows
pub fn parse_addresses(content: &str, limit: usize) -> std::result::Result<Vec<String>, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    rows(content)
        .into_iter()
        .filter(|(_, row)| !row.trim().is_empty())
        .skip(1)
        .take(limit)
        .map(|(line, row)| {
            let field = leading_field(row);
            if field.is_empty() {
                Err(format!("line {} has an empty first column", line))
            } else {
                Ok(field)
            }
        })
        .collect()
}

/// Split `content` into rows with their 1-based starting line
///
/// Newlines inside a quoted field belong to the row.
fn rows(content: &str) -> Vec<(usize, &str)> {
    let mut rows = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    let mut line = 1;
    let mut row_line = 1;

    for (index, c) in content.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\n' => {
                line += 1;
                if !in_quotes {
                    rows.push((row_line, content[start..index].trim_end_matches('\r')));
                    start = index + 1;
                    row_line = line;
                }
            }
            _ => {}
        }
    }
    if start < content.len() {
        rows.push((row_line, &content[start..]));
    }
    rows
}

/// First comma-separated field, with RFC 4180 quoting
fn leading_field(line: &str) -> String {
    let line = line.trim_start();

    let Some(quoted) = line.strip_prefix('"') else {
        return line.split(',').next().unwrap_or_default().trim().to_string();
    };

    let mut field = String::new();
    let mut chars = quoted.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => break,
            _ => field.push(c),
        }
    }
    field.trim().to_string()
}

/// Factory for creating CSV address sources
pub struct CsvFactory;

impl AddressSourceFactory for CsvFactory {
    fn create(&self, config: &AddressSourceConfig) -> Result<Box<dyn AddressSource>> {
        if config.type_name() != SOURCE_NAME {
            return Err(Error::config(format!(
                "Invalid address source type for CSV factory: {}",
                config.type_name()
            )));
        }
        Ok(Box::new(CsvAddressSource::new()))
    }
}

/// Register the CSV address source with a registry
pub fn register(registry: &PluginRegistry) {
    registry.register_address_source(SOURCE_NAME, Box::new(CsvFactory));
}
