// src/process/reorder.rs

use anyhow::{Context, Result};
use csv::{Reader, ReaderBuilder, StringRecord, Writer, WriterBuilder};
use std::{
    io::{Read, Write},
    path::Path,
};
use tracing::{debug, info, warn};

use crate::layout::{ColumnLayout, LayoutConfig};
use crate::process::{
    utils::{is_blank_row, strip_quotes},
    TransformStats,
};

/// Moves columns from the source layout into the target layout.
#[derive(Debug, Clone)]
pub struct ColumnReorderer {
    source: ColumnLayout,
    target: ColumnLayout,
    /// `destinations[p]` is the target index for source position `p`.
    destinations: Vec<usize>,
}

impl ColumnReorderer {
    /// Fails if a source column has no place in the target layout.
    pub fn new(source: ColumnLayout, target: ColumnLayout) -> Result<Self> {
        let destinations = source
            .destinations_in(&target)
            .context("mapping source layout onto target layout")?;
        debug!(?destinations, "built column mapping");
        Ok(Self {
            source,
            target,
            destinations,
        })
    }

    pub fn from_config(cfg: &LayoutConfig) -> Result<Self> {
        Self::new(cfg.source.clone(), cfg.target.clone())
    }

    pub fn source(&self) -> &ColumnLayout {
        &self.source
    }

    pub fn target(&self) -> &ColumnLayout {
        &self.target
    }

    /// Place each (unquoted) header name at its target index.
    ///
    /// Names the target layout doesn't know, or whose target index is past
    /// the end of a short header, stay at their own index. If two names end
    /// up on the same index the later one wins.
    pub fn remap_header<S: AsRef<str>>(&self, header: &[S]) -> Vec<String> {
        let mut out = vec![String::new(); header.len()];
        let mut filled = vec![false; header.len()];

        for (idx, raw) in header.iter().enumerate() {
            let name = strip_quotes(raw.as_ref());
            let dest = match self.target.position(name) {
                Some(dest) if dest < out.len() => dest,
                _ => idx,
            };
            if filled[dest] {
                warn!(
                    column = name,
                    index = dest,
                    replaced = %out[dest],
                    "header columns collide; keeping the later one"
                );
            }
            out[dest] = name.to_string();
            filled[dest] = true;
        }
        out
    }

    /// Remap one data row, or `None` if every field is empty.
    ///
    /// The output has the same length as `row`. Fields past the end of the
    /// source layout keep their position and their quotes. In a row shorter
    /// than the source layout, a field whose destination lies past the end
    /// is dropped.
    pub fn remap_row<S: AsRef<str>>(&self, row: &[S]) -> Option<Vec<String>> {
        if is_blank_row(row) {
            return None;
        }

        let mut out = vec![String::new(); row.len()];
        for (pos, field) in row.iter().enumerate() {
            let field = field.as_ref();
            match self.destinations.get(pos) {
                Some(&dest) if dest < out.len() => out[dest] = strip_quotes(field).to_string(),
                Some(&dest) => debug!(
                    position = pos,
                    destination = dest,
                    value = field,
                    "destination past end of short row, dropping field"
                ),
                None => out[pos] = field.to_string(),
            }
        }
        Some(out)
    }

    /// In-memory version of [`reorder_records`](Self::reorder_records); the
    /// first row is treated as the header.
    pub fn transform<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> Vec<Vec<String>> {
        let mut iter = rows.iter();
        let Some(header) = iter.next() else {
            return Vec::new();
        };

        let mut out = Vec::with_capacity(rows.len());
        out.push(self.remap_header(header));
        out.extend(iter.filter_map(|row| self.remap_row(row)));
        out
    }

    /// Stream every record from `reader` to `writer`, one row at a time.
    pub fn reorder_records<R: Read, W: Write>(
        &self,
        reader: &mut Reader<R>,
        writer: &mut Writer<W>,
    ) -> Result<TransformStats> {
        let mut stats = TransformStats::default();
        let mut header_len: Option<usize> = None;
        let mut record = StringRecord::new();

        loop {
            let more = reader
                .read_record(&mut record)
                .with_context(|| format!("CSV parse error at record {}", stats.rows_read))?;
            if !more {
                break;
            }
            let idx = stats.rows_read;
            stats.rows_read += 1;
            let fields: Vec<&str> = record.iter().collect();

            let out = match header_len {
                None => {
                    header_len = Some(fields.len());
                    self.remap_header(&fields)
                }
                Some(expected) => {
                    if fields.len() != expected {
                        warn!(
                            record = idx,
                            fields = fields.len(),
                            expected,
                            "row length differs from header"
                        );
                    }
                    match self.remap_row(&fields) {
                        Some(row) => row,
                        None => {
                            debug!(record = idx, "skipping empty row");
                            stats.rows_skipped += 1;
                            continue;
                        }
                    }
                }
            };

            writer
                .write_record(&out)
                .with_context(|| format!("writing record {}", idx))?;
            stats.rows_written += 1;
        }

        writer.flush().context("flushing CSV writer")?;
        Ok(stats)
    }

    /// Reorder the CSV at `input` into a new file at `output`.
    #[tracing::instrument(
        level = "info",
        skip(self, input, output),
        fields(input = %input.as_ref().display(), output = %output.as_ref().display())
    )]
    pub fn reorder_csv_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<TransformStats> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&input)
            .with_context(|| format!("opening {}", input.as_ref().display()))?;
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(&output)
            .with_context(|| format!("creating {}", output.as_ref().display()))?;

        let stats = self.reorder_records(&mut reader, &mut writer)?;
        info!(
            read = stats.rows_read,
            written = stats.rows_written,
            skipped = stats.rows_skipped,
            "reorder complete"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{SOURCE_COLUMNS, TARGET_COLUMNS};
    use std::{fs, io::Cursor};
    use tempfile::tempdir;

    fn builtin() -> ColumnReorderer {
        ColumnReorderer::from_config(&LayoutConfig::default()).unwrap()
    }

    fn sorted(row: &[String]) -> Vec<String> {
        let mut v = row.to_vec();
        v.sort();
        v
    }

    #[test]
    fn remaps_source_ordered_row() {
        let row = [
            "Oak School",
            "5000",
            "Primary",
            "Public",
            "OAK01",
            "1 Main St",
            "1234",
            "Springfield",
            "VIC",
            "144.9",
            "-37.8",
        ];
        let out = builtin().remap_row(&row).unwrap();
        assert_eq!(
            out,
            vec![
                "OAK01",
                "Oak School",
                "Primary",
                "Public",
                "VIC",
                "5000",
                "1 Main St",
                "1234",
                "Springfield",
                "144.9",
                "-37.8",
            ]
        );
        let input: Vec<String> = row.iter().map(|s| s.to_string()).collect();
        assert_eq!(sorted(&out), sorted(&input));
    }

    #[test]
    fn drops_all_empty_row() {
        assert_eq!(builtin().remap_row(&[""; 11]), None);
    }

    #[test]
    fn strips_quote_artifacts() {
        let mut row = vec!["x"; 11];
        row[4] = "\"ACME\"";
        let out = builtin().remap_row(&row).unwrap();
        assert_eq!(out[0], "ACME");
    }

    #[test]
    fn extra_fields_stay_in_place() {
        let mut row: Vec<String> = (0..11).map(|i| format!("f{}", i)).collect();
        row.push("\"extra\"".to_string());
        let out = builtin().remap_row(&row).unwrap();
        assert_eq!(out.len(), 12);
        assert_eq!(out[0], "f4");
        assert_eq!(out[11], "\"extra\"");
    }

    #[test]
    fn double_wrapped_quotes_are_stripped() {
        let mut row = vec!["x"; 11];
        row[4] = "\"\"ACME\"\"";
        let out = builtin().remap_row(&row).unwrap();
        assert_eq!(out[0], "ACME");
    }

    #[test]
    fn short_row_keeps_length_without_duplicates() {
        let row = ["Oak", "5000", "Primary", "Public", "OAK01"];
        let out = builtin().remap_row(&row).unwrap();
        // ppd belongs at index 5, past the end of this row.
        assert_eq!(out, vec!["OAK01", "Oak", "Primary", "Public", ""]);
    }

    #[test]
    fn long_row_keeps_length_and_tail() {
        let mut row: Vec<String> = (0..11).map(|i| format!("\"f{}\"", i)).collect();
        row.push("\"t11\"".to_string());
        row.push("t12".to_string());
        let out = builtin().remap_row(&row).unwrap();
        assert_eq!(out.len(), 13);
        assert_eq!(out[0], "f4");
        assert_eq!(out[4], "f8");
        assert_eq!(out[11], "\"t11\"");
        assert_eq!(out[12], "t12");
    }

    #[test]
    fn row_properties_hold_for_every_length() {
        let r = builtin();
        for len in 0..=13usize {
            let row: Vec<String> = (0..len)
                .map(|i| {
                    if i % 3 == 0 {
                        format!("\"v{}\"", i)
                    } else {
                        format!("v{}", i)
                    }
                })
                .collect();
            let Some(out) = r.remap_row(&row) else {
                assert_eq!(len, 0, "only the empty row is dropped");
                continue;
            };
            assert_eq!(out.len(), len, "length for {} fields", len);

            let in_layout = len.min(SOURCE_COLUMNS.len());
            let stripped: Vec<String> = row[..in_layout]
                .iter()
                .map(|f| strip_quotes(f).to_string())
                .collect();
            let moved: Vec<String> = out[..in_layout]
                .iter()
                .filter(|f| !f.is_empty())
                .cloned()
                .collect();

            if len >= SOURCE_COLUMNS.len() {
                assert_eq!(sorted(&moved), sorted(&stripped), "fields for {} fields", len);
                assert_eq!(&out[in_layout..], &row[in_layout..]);
            } else {
                // every surviving value comes from the input exactly once
                for v in &moved {
                    assert_eq!(moved.iter().filter(|m| *m == v).count(), 1);
                    assert!(stripped.contains(v), "{} not in input", v);
                }
            }
        }
    }

    #[test]
    fn row_count_drops_only_blank_rows() {
        let r = builtin();
        let mut rows: Vec<Vec<String>> =
            vec![SOURCE_COLUMNS.iter().map(|s| s.to_string()).collect()];
        let mut blanks = 0;
        for len in 0..=13usize {
            rows.push(vec![String::new(); len]);
            blanks += 1;
            rows.push((0..len).map(|i| format!("r{}c{}", len, i)).collect());
            if len == 0 {
                blanks += 1;
            }
        }
        let out = r.transform(&rows);
        assert_eq!(out.len(), rows.len() - blanks);
        assert!(out.len() <= rows.len());
    }

    #[test]
    fn short_header_keeps_length() {
        // ppd belongs at 5, past the end, so it stays put.
        let out = builtin().remap_header(&["code", "ppd"]);
        assert_eq!(out, vec!["code", "ppd"]);
        let out = builtin().remap_header(&["latitude"]);
        assert_eq!(out, vec!["latitude"]);
    }

    #[test]
    fn header_is_placed_by_name() {
        let r = builtin();
        assert_eq!(r.remap_header(&SOURCE_COLUMNS), TARGET_COLUMNS.to_vec());

        let quoted: Vec<String> = SOURCE_COLUMNS.iter().map(|c| format!("\"{}\"", c)).collect();
        assert_eq!(r.remap_header(&quoted), TARGET_COLUMNS.to_vec());
    }

    #[test]
    fn canonical_header_is_a_fixed_point() {
        let r = builtin();
        let once = r.remap_header(&TARGET_COLUMNS);
        let twice = r.remap_header(&once);
        assert_eq!(once, TARGET_COLUMNS.to_vec());
        assert_eq!(twice, once);
    }

    #[test]
    fn unknown_header_keeps_index_and_later_column_wins() {
        let r = builtin();
        // "code" belongs at 0, "district" is unknown at index 0; "code" comes later.
        let header = ["district", "code"];
        let out = r.remap_header(&header);
        assert_eq!(out, vec!["code".to_string(), String::new()]);

        let out = r.remap_header(&["mystery", "other"]);
        assert_eq!(out, vec!["mystery", "other"]);
    }

    #[test]
    fn lookup_failure_on_construction() {
        let source = ColumnLayout::new(["name", "district"]);
        assert!(ColumnReorderer::new(source, ColumnLayout::target()).is_err());
    }

    #[test]
    fn transform_counts_rows() {
        let rows = vec![
            SOURCE_COLUMNS.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            vec![String::new(); 11],
            (0..11).map(|i| i.to_string()).collect(),
            vec![String::new(); 11],
        ];
        let out = builtin().transform(&rows);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], TARGET_COLUMNS.to_vec());
        assert_eq!(out[1][0], "4");
        assert!(builtin().transform::<String>(&[]).is_empty());
    }

    #[test]
    fn streams_records() -> Result<()> {
        let input = "name,ppd,level,category,code,address,postcode,city,state,longitude,latitude\n\
                     Oak School,5000,Primary,Public,OAK01,1 Main St,1234,Springfield,VIC,144.9,-37.8\n\
                     ,,,,,,,,,,\n";
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(Cursor::new(input));
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

        let stats = builtin().reorder_records(&mut reader, &mut writer)?;
        assert_eq!(
            stats,
            TransformStats {
                rows_read: 3,
                rows_written: 2,
                rows_skipped: 1
            }
        );

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("{}", e.error()))?;
        assert_eq!(
            String::from_utf8(bytes)?,
            "code,name,level,category,state,ppd,address,postcode,city,longitude,latitude\n\
             OAK01,Oak School,Primary,Public,VIC,5000,1 Main St,1234,Springfield,144.9,-37.8\n"
        );
        Ok(())
    }

    #[test]
    fn file_roundtrip_and_missing_input() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("school.csv");
        let output = dir.path().join("fixed-school.csv");
        fs::write(
            &input,
            "\"name\",\"ppd\",\"level\",\"category\",\"code\",\"address\",\"postcode\",\"city\",\"state\",\"longitude\",\"latitude\"\n\
             A,1,L,C,X1,Addr,1000,Town,QLD,1.0,2.0\n",
        )?;

        let stats = builtin().reorder_csv_file(&input, &output)?;
        assert_eq!(stats.rows_written, 2);
        let out = fs::read_to_string(&output)?;
        assert!(out.starts_with("code,name,level"));
        assert!(out.contains("X1,A,L,C,QLD,1,Addr,1000,Town,1.0,2.0"));

        let missing = dir.path().join("nope.csv");
        assert!(builtin().reorder_csv_file(&missing, &output).is_err());
        Ok(())
    }
}
