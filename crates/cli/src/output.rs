use crate::error::CliError;
use model::{
    records::row::Row,
    view::{snapshot::ViewSnapshot, state::SortDirection},
};
use std::path::Path;

/// Cells wider than this are cut and end with `~`.
const MAX_CELL_WIDTH: usize = 40;

fn cell(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
    cut.push('~');
    cut
}

fn header(column: &str, snapshot: &ViewSnapshot) -> String {
    match &snapshot.sort.key {
        Some(key) if key == column => {
            let arrow = match snapshot.sort.direction {
                SortDirection::Ascending => '^',
                SortDirection::Descending => 'v',
            };
            format!("{column} {arrow}")
        }
        _ => column.to_string(),
    }
}

/// Renders the page as an aligned text table followed by a pager line.
pub fn render_table(snapshot: &ViewSnapshot) -> String {
    let headers: Vec<String> = snapshot
        .columns
        .iter()
        .map(|c| header(c, snapshot))
        .collect();
    let cells: Vec<Vec<String>> = snapshot
        .rows
        .iter()
        .map(|row| {
            snapshot
                .columns
                .iter()
                .map(|c| cell(&row.get_value(c).to_string()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    // Trailing empty cells are dropped with their separators.
    let line = |values: &[String]| -> String {
        let used = values
            .iter()
            .rposition(|v| !v.is_empty())
            .map_or(0, |last| last + 1);
        values[..used]
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    if snapshot.columns.is_empty() {
        out.push_str("(no rows)\n");
    } else {
        out.push_str(&line(&headers));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("-+-"));
        out.push('\n');
        for row in &cells {
            out.push_str(&line(row));
            out.push('\n');
        }
        if snapshot.is_empty() {
            out.push_str("(no matching rows)\n");
        }
    }
    out.push_str(&pager(snapshot));
    out
}

fn pager(snapshot: &ViewSnapshot) -> String {
    let mut line = format!(
        "Page {} of {} ({} of {} rows)",
        snapshot.page, snapshot.total_pages, snapshot.filtered_count, snapshot.total_count
    );
    if !snapshot.filter.is_empty() {
        line.push_str(&format!(", filter '{}'", snapshot.filter));
    }
    if snapshot.has_prev() {
        line.push_str("  < prev");
    }
    if snapshot.has_next() {
        line.push_str("  next >");
    }
    if snapshot.more_available {
        line.push_str("  [more available]");
    }
    line
}

pub fn render_json(snapshot: &ViewSnapshot) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn render_columns(columns: &[String]) -> String {
    columns.join("\n")
}

/// Writes the rows as a JSON array to `path`, or stdout when absent.
pub async fn write_rows(rows: &[Row], path: Option<&Path>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(rows)?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}
