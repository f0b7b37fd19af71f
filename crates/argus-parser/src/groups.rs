//! DXF group code/value pair reader
//!
//! An ASCII DXF file is a flat sequence of two-line pairs: an integer group
//! code followed by its value. Everything structural (sections, entities,
//! blocks) is expressed as code 0 markers within that stream.

use argus_error::{ArgusError, Result};
use std::str::Lines;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Group<'a> {
    pub code: i32,
    pub value: &'a str,
    /// 1-based line number of the code line
    pub line: usize,
}

impl<'a> Group<'a> {
    /// A code 0 marker with the given value, e.g. `SECTION` or `INSERT`
    pub fn is_marker(&self, value: &str) -> bool {
        self.code == 0 && self.value.eq_ignore_ascii_case(value)
    }

    /// Finite real value; `nan` and `inf` are rejected
    pub fn as_f64(&self) -> Result<f64> {
        self.value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                ArgusError::drawing_at_line(
                    format!("Invalid real value '{}' for group {}", self.value, self.code),
                    self.line + 1,
                )
            })
    }

    pub fn as_i64(&self) -> Result<i64> {
        // Some writers emit integer groups with a decimal point
        self.value
            .parse::<i64>()
            .or_else(|_| self.value.parse::<f64>().map(|v| v as i64))
            .map_err(|_| {
                ArgusError::drawing_at_line(
                    format!(
                        "Invalid integer value '{}' for group {}",
                        self.value, self.code
                    ),
                    self.line + 1,
                )
            })
    }
}

pub struct GroupReader<'a> {
    lines: Lines<'a>,
    line: usize,
    peeked: Option<Group<'a>>,
}

impl<'a> GroupReader<'a> {
    pub fn new(text: &'a str) -> Self {
        // Tolerate a UTF-8 byte order mark before the first group
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Self {
            lines: text.lines(),
            line: 0,
            peeked: None,
        }
    }

    /// Current line number (the last line consumed)
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn next_group(&mut self) -> Result<Option<Group<'a>>> {
        if let Some(group) = self.peeked.take() {
            return Ok(Some(group));
        }
        self.read_group()
    }

    pub fn peek(&mut self) -> Result<Option<Group<'a>>> {
        if self.peeked.is_none() {
            self.peeked = self.read_group()?;
        }
        Ok(self.peeked)
    }

    /// Consume groups up to (not including) the next code 0 marker
    pub fn read_body(&mut self) -> Result<Vec<Group<'a>>> {
        let mut body = Vec::new();
        while let Some(group) = self.peek()? {
            if group.code == 0 {
                break;
            }
            self.peeked = None;
            body.push(group);
        }
        Ok(body)
    }

    fn read_group(&mut self) -> Result<Option<Group<'a>>> {
        let code_line = loop {
            match self.lines.next() {
                Some(line) => {
                    self.line += 1;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Ok(None),
            }
        };
        let code_line_number = self.line;
        let code = code_line.trim().parse::<i32>().map_err(|_| {
            ArgusError::drawing_at_line(
                format!("Expected group code, found '{}'", code_line.trim()),
                code_line_number,
            )
        })?;
        let value = match self.lines.next() {
            Some(value) => {
                self.line += 1;
                value.trim()
            }
            None => {
                return Err(ArgusError::drawing_at_line(
                    format!("Truncated file: group {code} has no value"),
                    code_line_number,
                ))
            }
        };
        Ok(Some(Group {
            code,
            value,
            line: code_line_number,
        }))
    }
}
