//! In-memory workbook backed by xlsx bytes.
//!
//! Every worksheet is materialized on load and re-serialized on save: reading
//! goes through `calamine`, writing through `rust_xlsxwriter`. Cell values
//! survive the round trip; styling other than the header row and number
//! formats for dates and durations does not.

use crate::utils::AppError;
use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::Cursor;

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const DURATION_FORMAT: &str = "[h]:mm:ss";

/// A single cell value as far as this service cares.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date; the fractional part is the time of day.
    DateTime(f64),
    /// Elapsed time in days.
    Duration(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) if dt.is_duration() => Cell::Duration(dt.as_f64()),
            Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
            other => Cell::Text(other.to_string()),
        }
    }
}

#[cfg(test)]
static EMPTY_CELL: Cell = Cell::Empty;

/// Header definition for one column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub width: f64,
}

/// Rectangular-ish grid of cells; row 0 is the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn with_header(columns: &[Column]) -> Self {
        let header = columns.iter().map(|c| Cell::text(c.header)).collect();
        Self { rows: vec![header] }
    }

    fn from_range(range: &calamine::Range<Data>) -> Self {
        let mut sheet = Sheet::default();
        // Used range may start below/right of A1; keep absolute positions.
        if let Some((start_row, start_col)) = range.start() {
            for (r, row) in range.rows().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    let cell = Cell::from(value);
                    if cell != Cell::Empty {
                        sheet.set_cell(start_row as usize + r, start_col as usize + c, cell);
                    }
                }
            }
        }
        sheet
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|c| *c == Cell::Empty))
    }

    #[cfg(test)]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    #[cfg(test)]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Linear scan of `col` for a text cell equal to `value` (case-sensitive).
    /// The header row is never considered. When several rows match, the last
    /// one wins.
    pub fn find_row(&self, col: usize, value: &str) -> Option<usize> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, row)| row.get(col).and_then(Cell::as_text) == Some(value))
            .map(|(index, _)| index)
            .last()
    }

    /// Overwrites the leading cells of `index` with `cells`. Cells past the
    /// end of `cells` are left alone.
    pub fn overwrite_row(&mut self, index: usize, cells: Vec<Cell>) {
        for (col, cell) in cells.into_iter().enumerate() {
            self.set_cell(index, col, cell);
        }
    }

    /// Appends after the last row holding any value; returns its index.
    pub fn append_row(&mut self, cells: Vec<Cell>) -> usize {
        while self
            .rows
            .last()
            .is_some_and(|row| row.iter().all(|c| *c == Cell::Empty))
        {
            self.rows.pop();
        }
        self.rows.push(cells);
        self.rows.len() - 1
    }

    fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, Cell::Empty);
        }
        cells[col] = cell;
    }

    fn write_to(
        &self,
        worksheet: &mut Worksheet,
        formats: &Formats,
        layout: Option<&[Column]>,
    ) -> Result<(), AppError> {
        if let Some(columns) = layout {
            for (col, column) in columns.iter().enumerate() {
                worksheet
                    .set_column_width(col as u16, column.width)
                    .map_err(xlsx_error)?;
            }
        }

        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) if r == 0 && layout.is_some() => {
                        worksheet
                            .write_string_with_format(r, c, s, &formats.header)
                            .map_err(xlsx_error)?;
                    }
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s).map_err(xlsx_error)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n).map_err(xlsx_error)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, c, *b).map_err(xlsx_error)?;
                    }
                    Cell::DateTime(serial) => {
                        let format = if serial.fract() == 0.0 {
                            &formats.date
                        } else {
                            &formats.datetime
                        };
                        worksheet
                            .write_number_with_format(r, c, *serial, format)
                            .map_err(xlsx_error)?;
                    }
                    Cell::Duration(days) => {
                        worksheet
                            .write_number_with_format(r, c, *days, &formats.duration)
                            .map_err(xlsx_error)?;
                    }
                }
            }
        }

        Ok(())
    }
}

struct Formats {
    header: Format,
    date: Format,
    datetime: Format,
    duration: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format(DATE_FORMAT),
            datetime: Format::new().set_num_format(DATETIME_FORMAT),
            duration: Format::new().set_num_format(DURATION_FORMAT),
        }
    }
}

/// Named worksheets in workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Book {
    sheets: Vec<(String, Sheet)>,
}

impl Book {
    pub fn with_sheet(name: impl Into<String>, sheet: Sheet) -> Self {
        Self {
            sheets: vec![(name.into(), sheet)],
        }
    }

    /// Parses `bytes` as xlsx, loading every worksheet. A file that cannot
    /// be parsed at all is an error.
    pub fn from_xlsx(bytes: &[u8]) -> Result<Self, AppError> {
        let mut workbook = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| AppError::WorkbookError(format!("Failed to open workbook: {}", e)))?;

        let mut book = Book::default();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| AppError::WorkbookError(format!("Failed to read {}: {}", name, e)))?;
            let sheet = Sheet::from_range(&range);
            book.sheets.push((name, sheet));
        }

        Ok(book)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Replaces the sheet called `name` in place, or adds it at the end.
    pub fn set_sheet(&mut self, name: &str, sheet: Sheet) {
        match self.sheet_mut(name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push((name.to_string(), sheet)),
        }
    }

    /// Serializes every sheet. `styled` gets the column widths and a bold
    /// header row; the other sheets are written as plain values.
    pub fn to_xlsx(&self, styled: &str, columns: &[Column]) -> Result<Vec<u8>, AppError> {
        let mut workbook = Workbook::new();
        let formats = Formats::new();

        for (name, sheet) in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).map_err(xlsx_error)?;
            let layout = (name == styled).then_some(columns);
            sheet.write_to(worksheet, &formats, layout)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| AppError::WorkbookError(format!("Failed to serialize workbook: {}", e)))
    }
}

fn xlsx_error(e: rust_xlsxwriter::XlsxError) -> AppError {
    AppError::WorkbookError(format!("Failed to write worksheet: {}", e))
}
