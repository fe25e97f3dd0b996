use std::fmt;

use chrono::{DateTime, Utc};
use tsidx_core::format_period;
use tsidx_core::table::format_ts;

use crate::TsIdxData;

const LABEL_WIDTH: usize = 13;

impl fmt::Display for TsIdxData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:LABEL_WIDTH$} {}", "Name:", self.cfg.name)?;
        if self.table.is_empty() {
            writeln!(f, "Contains no data!")?;
            return writeln!(f, "{:LABEL_WIDTH$} {}", "Length:", self.table.len());
        }

        writeln!(
            f,
            "{:LABEL_WIDTH$} {:18} {:10} datetime",
            "Index:",
            self.table.index_name(),
            "datatype:"
        )?;
        writeln!(f, "Columns:")?;
        for (name, dtype) in self.table.schema() {
            writeln!(f, "{:4} {name:15} {dtype}", "")?;
        }
        writeln!(f, "{:LABEL_WIDTH$} {}", "Value Query:", self.filter.describe())?;
        let ts = |t: Option<&DateTime<Utc>>| t.map_or_else(String::new, |t| format_ts(*t));
        writeln!(f, "{:LABEL_WIDTH$} {}", "Start Time:", ts(self.table.index().first()))?;
        writeln!(f, "{:LABEL_WIDTH$} {}", "End Time:", ts(self.table.index().last()))?;
        let period = self.sample_period.map(format_period).unwrap_or_default();
        writeln!(f, "{:LABEL_WIDTH$} {period}", "Period:")?;
        writeln!(f, "{:LABEL_WIDTH$} {}", "Length:", self.table.len())?;
        writeln!(f)?;
        write_rows(self, f)
    }
}

fn write_rows(data: &TsIdxData, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let table = &data.table;
    let index: Vec<String> = table.index().iter().map(|t| format_ts(*t)).collect();
    let cells: Vec<Vec<String>> = table
        .columns()
        .iter()
        .map(|c| (0..table.len()).map(|i| c.data.display_cell(i)).collect())
        .collect();

    let index_width = index
        .iter()
        .map(String::len)
        .chain([table.index_name().len()])
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .zip(&cells)
        .map(|(c, col)| col.iter().map(String::len).chain([c.name.len()]).max().unwrap_or(0))
        .collect();

    write!(f, "Data:\n{:index_width$}", table.index_name())?;
    for (c, w) in table.columns().iter().zip(&widths) {
        write!(f, "  {:>w$}", c.name)?;
    }
    writeln!(f)?;
    for (row, label) in index.iter().enumerate() {
        write!(f, "{label:index_width$}")?;
        for (col, w) in cells.iter().zip(&widths) {
            write!(f, "  {:>w$}", col[row])?;
        }
        writeln!(f)?;
    }
    Ok(())
}
