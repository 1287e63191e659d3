//! In-memory table built from a sheet's used range

use calamine::{Data, Range};
use std::collections::HashMap;

/// A flattened sheet: one header row plus data rows of the same width
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from a sheet range
    ///
    /// The first row becomes the header. Rows where every cell is empty are dropped.
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Self::default();
        };

        let headers = normalize_headers(header_row.iter().map(render_cell).collect());
        let rows = rows
            .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
            .map(|row| row.iter().map(render_cell).collect())
            .collect();

        Self { headers, rows }
    }

    /// A sheet without any cells
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Render a cell the way it reads in the sheet
pub fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => render_float(*f),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::Error(e) => e.to_string(),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                dt.as_duration()
                    .map_or_else(|| render_float(dt.as_f64()), |d| render_duration(d.num_seconds()))
            } else {
                dt.as_datetime().map_or_else(
                    || render_float(dt.as_f64()),
                    |d| d.format("%Y-%m-%d %H:%M:%S").to_string(),
                )
            }
        }
    }
}

/// Shortest round-trip decimal, switching to exponent form outside `1e-4..1e16`
///
/// Integral values drop the fraction: `10`, not `10.0`. Exponents carry a sign
/// and at least two digits, so `1e20` renders as `1e+20` and `1e-7` as `1e-07`.
pub fn render_float(f: f64) -> String {
    if f == 0.0 || !f.is_finite() {
        return f.to_string();
    }

    let sci = format!("{f:e}");
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return f.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return f.to_string();
    };

    if (-4..16).contains(&exponent) {
        f.to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

/// `H:MM:SS` with a single leading sign for negative spans
fn render_duration(total_secs: i64) -> String {
    let sign = if total_secs < 0 { "-" } else { "" };
    let secs = total_secs.unsigned_abs();
    format!("{sign}{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Fill blank labels and disambiguate repeated ones
///
/// Blank label at column `i` becomes `Unnamed: i`. A repeat of `x` becomes
/// `x.N`, where `N` counts earlier uses of `x`; if that name is itself taken,
/// the same rule applies to it, so `x, x.1, x` ends up `x, x.1, x.1.1`.
/// Only earlier labels are consulted.
pub fn normalize_headers(labels: Vec<String>) -> Vec<String> {
    let labels: Vec<String> = labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            if label.is_empty() {
                format!("Unnamed: {i}")
            } else {
                label
            }
        })
        .collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(labels.len());

    for mut label in labels {
        let mut count = counts.get(&label).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(label.clone(), count + 1);
            label = format!("{label}.{count}");
            count = counts.get(&label).copied().unwrap_or(0);
        }
        counts.insert(label.clone(), count + 1);
        out.push(label);
    }

    out
}
