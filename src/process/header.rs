// src/process/header.rs

use anyhow::{anyhow, Context, Result};
use csv::{Reader, ReaderBuilder, StringRecord, Writer, WriterBuilder};
use std::{
    io::{Read, Write},
    path::Path,
};
use tracing::{debug, info};

use crate::layout::ColumnLayout;
use crate::process::TransformStats;

/// Swaps the first row of a CSV for a fixed header and copies the rest as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderReplacer {
    header: Vec<String>,
}

impl Default for HeaderReplacer {
    fn default() -> Self {
        Self::canonical()
    }
}

impl HeaderReplacer {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
        }
    }

    /// `code,name,level,category,state,ppd,address,postcode,city,longitude,latitude`
    pub fn canonical() -> Self {
        Self::from_layout(&ColumnLayout::target())
    }

    pub fn from_layout(layout: &ColumnLayout) -> Self {
        Self::new(layout.columns().iter().cloned())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// In-memory version of [`replace_records`](Self::replace_records).
    pub fn transform<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> Result<Vec<Vec<String>>> {
        let (_, body) = rows
            .split_first()
            .ok_or_else(|| anyhow!("input has no header row to replace"))?;

        let mut out = Vec::with_capacity(rows.len());
        out.push(self.header.clone());
        out.extend(
            body.iter()
                .map(|row| row.iter().map(|f| f.as_ref().to_string()).collect()),
        );
        Ok(out)
    }

    /// Discard the first record of `reader`, then write the replacement
    /// header followed by every remaining record untouched.
    ///
    /// An empty input is an error and nothing is written.
    pub fn replace_records<R: Read, W: Write>(
        &self,
        reader: &mut Reader<R>,
        writer: &mut Writer<W>,
    ) -> Result<TransformStats> {
        let old = take_first_record(reader)?;
        self.write_replaced(&old, reader, writer)
    }

    fn write_replaced<R: Read, W: Write>(
        &self,
        old: &StringRecord,
        reader: &mut Reader<R>,
        writer: &mut Writer<W>,
    ) -> Result<TransformStats> {
        debug!(old = ?old, new = ?self.header, "replacing header");
        writer
            .write_record(&self.header)
            .context("writing replacement header")?;

        let mut stats = TransformStats {
            rows_read: 1,
            rows_written: 1,
            rows_skipped: 0,
        };
        let mut record = StringRecord::new();
        while reader
            .read_record(&mut record)
            .with_context(|| format!("CSV parse error at record {}", stats.rows_read))?
        {
            writer
                .write_record(&record)
                .with_context(|| format!("writing record {}", stats.rows_read))?;
            stats.rows_read += 1;
            stats.rows_written += 1;
        }

        writer.flush().context("flushing CSV writer")?;
        Ok(stats)
    }

    /// Replace the header of the CSV at `input`, writing the result to `output`.
    ///
    /// The output file is only created once the input is known to have a
    /// header row.
    #[tracing::instrument(
        level = "info",
        skip(self, input, output),
        fields(input = %input.as_ref().display(), output = %output.as_ref().display())
    )]
    pub fn replace_header_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<TransformStats> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&input)
            .with_context(|| format!("opening {}", input.as_ref().display()))?;
        let old = take_first_record(&mut reader)
            .with_context(|| format!("reading header of {}", input.as_ref().display()))?;

        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(&output)
            .with_context(|| format!("creating {}", output.as_ref().display()))?;

        let stats = self.write_replaced(&old, &mut reader, &mut writer)?;
        info!(
            read = stats.rows_read,
            written = stats.rows_written,
            "header replaced"
        );
        Ok(stats)
    }
}

fn take_first_record<R: Read>(reader: &mut Reader<R>) -> Result<StringRecord> {
    let mut record = StringRecord::new();
    if !reader
        .read_record(&mut record)
        .context("CSV parse error at record 0")?
    {
        return Err(anyhow!("input has no header row to replace"));
    }
    Ok(record)
}
