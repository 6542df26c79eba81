//! Ledger sheet layout and A1 notation helpers

/// 1-based index of an A1 column label (`A` = 1, `AC` = 29)
pub fn column_index(label: &str) -> Option<u32> {
    if label.is_empty() {
        return None;
    }
    label.chars().try_fold(0u32, |acc, c| {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })
}

/// A rectangular cell range; `end_row` is open when absent (`B3:C`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_col: u32,
    pub start_row: u32,
    pub end_col: u32,
    pub end_row: Option<u32>,
}

fn split_cell(cell: &str) -> Option<(u32, Option<u32>)> {
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);
    let col = column_index(letters)?;
    let row = if digits.is_empty() {
        None
    } else {
        Some(digits.parse::<u32>().ok().filter(|row| *row > 0)?)
    };
    Some((col, row))
}

impl CellRange {
    /// Parses `Sheet!B3:C`, `'My Sheet'!AC5:AD5` or a bare `B7`
    pub fn parse(range: &str) -> Option<Self> {
        let cells = range.rsplit_once('!').map_or(range, |(_, cells)| cells);
        let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
        let (start_col, start_row) = split_cell(start)?;
        let (end_col, end_row) = split_cell(end)?;
        let start_row = start_row?;
        if end_col < start_col || end_row.is_some_and(|row| row < start_row) {
            return None;
        }
        Some(Self {
            start_col,
            start_row,
            end_col,
            end_row,
        })
    }
}

/// Where the ledger keeps each value of a project row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLayout {
    pub sheet_name: String,
    pub id_column: String,
    pub name_column: String,
    pub status_column: String,
    pub error_column: String,
    /// First data row, below the headers
    pub first_row: u32,
    pub last_row: Option<u32>,
}

impl Default for LedgerLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Project Configurator".to_string(),
            id_column: "B".to_string(),
            name_column: "C".to_string(),
            status_column: "AC".to_string(),
            error_column: "AD".to_string(),
            first_row: 3,
            last_row: None,
        }
    }
}

impl LedgerLayout {
    fn sheet_prefix(&self) -> String {
        if self.sheet_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            format!("{}!", self.sheet_name)
        } else {
            format!("'{}'!", self.sheet_name.replace('\'', "''"))
        }
    }

    /// Checks the column labels and their relative positions
    pub fn validate(&self) -> Result<(), String> {
        let id = column_index(&self.id_column)
            .ok_or_else(|| format!("invalid id column {}", self.id_column))?;
        let name = column_index(&self.name_column)
            .ok_or_else(|| format!("invalid name column {}", self.name_column))?;
        let status = column_index(&self.status_column)
            .ok_or_else(|| format!("invalid status column {}", self.status_column))?;
        let error = column_index(&self.error_column)
            .ok_or_else(|| format!("invalid error column {}", self.error_column))?;

        if name <= id {
            return Err("name column must be to the right of the id column".into());
        }
        if error != status + 1 {
            return Err("error column must directly follow the status column".into());
        }
        if self.first_row == 0 {
            return Err("first_row is 1-based".into());
        }
        if self.last_row.is_some_and(|last| last < self.first_row) {
            return Err("last_row must not be above first_row".into());
        }
        Ok(())
    }

    /// Range holding the id and name columns of every data row
    pub fn scan_range(&self) -> String {
        match self.last_row {
            Some(last) => format!(
                "{}{}{}:{}{}",
                self.sheet_prefix(),
                self.id_column,
                self.first_row,
                self.name_column,
                last
            ),
            None => format!(
                "{}{}{}:{}",
                self.sheet_prefix(),
                self.id_column,
                self.first_row,
                self.name_column
            ),
        }
    }

    /// Offset of the name column from the id column within a scanned row
    pub fn name_offset(&self) -> usize {
        match (column_index(&self.id_column), column_index(&self.name_column)) {
            (Some(id), Some(name)) if name > id => (name - id) as usize,
            _ => 1,
        }
    }

    pub fn id_cell(&self, row: u32) -> String {
        format!("{}{}{}", self.sheet_prefix(), self.id_column, row)
    }

    /// Status and error cells of one row, as a single range
    pub fn status_range(&self, row: u32) -> String {
        format!(
            "{}{}{}:{}{}",
            self.sheet_prefix(),
            self.status_column,
            row,
            self.error_column,
            row
        )
    }
}
