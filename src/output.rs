// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Record output: line-delimited JSON or CSV

use crate::error::Result;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Record encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    /// One JSON document per record
    #[default]
    Json,
    /// Comma-separated values with a header row
    Csv,
}

/// A record the sink knows how to emit.
///
/// `HEADERS` is the fixed column list for the tabular form; `values` must
/// return one entry per header, in the same order.
pub trait Record: Serialize {
    /// Column names for the tabular form
    const HEADERS: &'static [&'static str];

    /// Column values rendered as strings
    fn values(&self) -> Vec<String>;
}

/// Render a list field as a single tabular value
#[must_use]
pub fn join_list(items: &[String]) -> String {
    items.join(";")
}

/// Destination for typed records
pub struct Sink {
    writer: Box<dyn Write>,
    format: Format,
    pretty: bool,
    header: Option<&'static [&'static str]>,
    emitted: usize,
}

impl Sink {
    /// Sink over an arbitrary writer
    pub fn new(writer: Box<dyn Write>, format: Format, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            header: None,
            emitted: 0,
        }
    }

    /// Sink appending to `path`, or writing to stdout when `None`
    pub fn open(path: Option<&Path>, format: Format, pretty: bool) -> Result<Self> {
        let writer: Box<dyn Write> = match path {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(io::stdout()),
        };
        Ok(Self::new(writer, format, pretty))
    }

    /// Number of records written so far
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Write one record
    pub fn emit<R: Record>(&mut self, record: &R) -> Result<()> {
        match self.format {
            Format::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, record)?;
                } else {
                    serde_json::to_writer(&mut self.writer, record)?;
                }
                self.writer.write_all(b"\n")?;
            }
            Format::Csv => {
                if self.header.is_none() {
                    write_row(&mut self.writer, R::HEADERS.iter().copied())?;
                    self.header = Some(R::HEADERS);
                }
                let values = record.values();
                debug_assert_eq!(values.len(), R::HEADERS.len());
                write_row(&mut self.writer, values.iter().map(String::as_str))?;
            }
        }
        self.writer.flush()?;
        self.emitted += 1;
        Ok(())
    }

    /// Write an untyped payload followed by a newline; not counted as a record
    pub fn write_raw(&mut self, payload: &[u8]) -> Result<()> {
        self.writer.write_all(payload)?;
        if !payload.ends_with(b"\n") {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and close the sink, returning the record count
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.emitted)
    }
}

fn write_row<'a, W, I>(writer: &mut W, fields: I) -> io::Result<()>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let line = fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")
}

/// Quote a CSV field holding a delimiter, quote, line break or leading
/// whitespace, or consisting of the end-of-data marker `\.`
#[must_use]
pub fn escape_field(field: &str) -> String {
    let needs_quotes = field.contains([',', '"', '\n', '\r'])
        || field.starts_with(char::is_whitespace)
        || field == "\\.";
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
