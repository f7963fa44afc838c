use crate::core::error::{ParseErrorKind, StructureError};
use std::io::BufRead;

/// One parsed fixed-column atom record.
///
/// Only the fields the assembly state machine consults are extracted. The
/// residue position keeps both the raw text (insertion codes and all) and
/// the leading integer the boundary detector compares.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub line: usize,
    pub atom_name: String,
    pub residue_name: String,
    pub chain_id: String,
    pub res_pos_raw: String,
    pub res_seq: isize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Extracts a column range from a line, tolerating short lines, and trims
/// surrounding whitespace.
pub fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    let len = line.len();
    let start = start.min(len);
    let end = end.min(len);
    line.get(start..end).unwrap_or("").trim()
}

fn parse_leading_int(text: &str) -> Option<isize> {
    let text = text.trim();
    let digits: usize = text
        .char_indices()
        .take_while(|&(i, c)| c.is_ascii_digit() || (i == 0 && c == '-'))
        .count();
    if digits == 0 || (digits == 1 && text.starts_with('-')) {
        return None;
    }
    text[..digits].parse().ok()
}

fn parse_coord(
    line: &str,
    line_no: usize,
    start: usize,
    end: usize,
) -> Result<f64, StructureError> {
    let text = slice_and_trim(line, start, end);
    text.parse().map_err(|_| StructureError::Parse {
        line: line_no,
        kind: ParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: text.to_string(),
        },
    })
}

fn parse_atom_record(line: &str, line_no: usize) -> Result<AtomRecord, StructureError> {
    let atom_name = slice_and_trim(line, 12, 16);
    if atom_name.is_empty() {
        return Err(StructureError::Parse {
            line: line_no,
            kind: ParseErrorKind::MissingRequiredField {
                columns: "13-16".to_string(),
            },
        });
    }
    let residue_name = slice_and_trim(line, 17, 21).to_string();
    let chain = slice_and_trim(line, 21, 22);
    // Blank chain identifiers default to "A".
    let chain_id = if chain.is_empty() { "A" } else { chain }.to_string();
    let res_pos_raw = slice_and_trim(line, 22, 27).to_string();
    let res_seq = parse_leading_int(&res_pos_raw).ok_or_else(|| StructureError::Parse {
        line: line_no,
        kind: ParseErrorKind::InvalidInt {
            columns: "23-27".to_string(),
            value: res_pos_raw.clone(),
        },
    })?;
    Ok(AtomRecord {
        line: line_no,
        atom_name: atom_name.to_string(),
        residue_name,
        chain_id,
        res_pos_raw,
        res_seq,
        x: parse_coord(line, line_no, 30, 38)?,
        y: parse_coord(line, line_no, 38, 46)?,
        z: parse_coord(line, line_no, 46, 54)?,
    })
}

/// A pull-based stream of atom records with one-record lookahead.
///
/// Boundary decisions peek at the next record without consuming it, which
/// replaces any need to rewind the underlying reader. Lines whose keyword is
/// not the atom-record marker are skipped.
pub struct RecordStream<R: BufRead> {
    reader: R,
    line_no: usize,
    peeked: Option<AtomRecord>,
}

impl<R: BufRead> RecordStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            peeked: None,
        }
    }

    /// The next atom record, without consuming it.
    pub fn peek(&mut self) -> Result<Option<&AtomRecord>, StructureError> {
        if self.peeked.is_none() {
            self.peeked = self.read_record()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Consumes and returns the next atom record.
    pub fn next_record(&mut self) -> Result<Option<AtomRecord>, StructureError> {
        if let Some(record) = self.peeked.take() {
            return Ok(Some(record));
        }
        self.read_record()
    }

    fn read_record(&mut self) -> Result<Option<AtomRecord>, StructureError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if slice_and_trim(&line, 0, 4) == "ATOM" {
                return parse_atom_record(line.trim_end_matches(['\n', '\r']), self.line_no)
                    .map(Some);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record_line(atom: &str, res: &str, chain: &str, seq: &str, x: f64) -> String {
        format!(
            "ATOM      1 {:<4} {:<4}{:1}{:>5}   {:>8.3}{:>8.3}{:>8.3}",
            atom, res, chain, seq, x, 2.0, 3.0
        )
    }

    #[test]
    fn atom_record_fields_come_from_fixed_columns() {
        let line = record_line("CA", "ALA", "B", "42", 11.25);
        let mut stream = RecordStream::new(Cursor::new(line));
        let record = stream.next_record().unwrap().unwrap();
        assert_eq!(record.atom_name, "CA");
        assert_eq!(record.residue_name, "ALA");
        assert_eq!(record.chain_id, "B");
        assert_eq!(record.res_seq, 42);
        assert!((record.x - 11.25).abs() < 1e-9);
        assert!((record.z - 3.0).abs() < 1e-9);
    }

    #[test]
    fn blank_chain_id_defaults_to_a() {
        let line = record_line("N", "GLY", " ", "1", 0.0);
        let mut stream = RecordStream::new(Cursor::new(line));
        assert_eq!(stream.next_record().unwrap().unwrap().chain_id, "A");
    }

    #[test]
    fn non_atom_lines_are_skipped() {
        let input = format!(
            "HEADER test\nREMARK 1\n{}\nTER\n{}\n",
            record_line("N", "GLY", "A", "1", 1.0),
            record_line("CA", "GLY", "A", "1", 2.0),
        );
        let mut stream = RecordStream::new(Cursor::new(input));
        assert_eq!(stream.next_record().unwrap().unwrap().atom_name, "N");
        assert_eq!(stream.next_record().unwrap().unwrap().atom_name, "CA");
        assert!(stream.next_record().unwrap().is_none());
    }

    #[test]
    fn peek_does_not_consume() {
        let line = record_line("CA", "ALA", "A", "7", 1.0);
        let mut stream = RecordStream::new(Cursor::new(line));
        assert_eq!(stream.peek().unwrap().unwrap().res_seq, 7);
        assert_eq!(stream.peek().unwrap().unwrap().res_seq, 7);
        assert!(stream.next_record().unwrap().is_some());
        assert!(stream.peek().unwrap().is_none());
    }

    #[test]
    fn residue_position_keeps_raw_text_and_leading_integer() {
        let line = record_line("CA", "ALA", "A", "52A", 1.0);
        let mut stream = RecordStream::new(Cursor::new(line));
        let record = stream.next_record().unwrap().unwrap();
        assert_eq!(record.res_pos_raw, "52A");
        assert_eq!(record.res_seq, 52);
    }

    #[test]
    fn garbage_coordinates_are_parse_errors() {
        let line = "ATOM      1 CA   ALA A    1      xx.xxx   2.000   3.000";
        let mut stream = RecordStream::new(Cursor::new(line));
        let err = stream.next_record().unwrap_err();
        assert!(matches!(err, StructureError::Parse { line: 1, .. }));
    }

    #[test]
    fn negative_residue_positions_parse() {
        let line = record_line("CA", "ALA", "A", "-2", 1.0);
        let mut stream = RecordStream::new(Cursor::new(line));
        assert_eq!(stream.next_record().unwrap().unwrap().res_seq, -2);
    }
}
