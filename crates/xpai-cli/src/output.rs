use owo_colors::OwoColorize;
use serde::Serialize;
use xpai_core::resource::ResourceRecord;
use xpai_core::types::{OutputFormat, ReadyStatus};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_yaml<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(value)?;
    print!("{}", yaml);
    Ok(())
}

/// Print `value` as JSON or YAML. Returns `false` for [`OutputFormat::Table`]
/// so the caller renders its own table.
pub fn print_structured<T: Serialize>(format: OutputFormat, value: &T) -> anyhow::Result<bool> {
    match format {
        OutputFormat::Json => print_json(value)?,
        OutputFormat::Yaml => print_yaml(value)?,
        OutputFormat::Table => return Ok(false),
    }
    Ok(true)
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// Shorten `s` to at most `max` characters, marking the cut with `...`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    format!("{}...", s.chars().take(keep).collect::<String>())
}

pub fn status_label(status: ReadyStatus, color: bool) -> String {
    if !color {
        return status.label().to_string();
    }
    match status {
        ReadyStatus::Ready => status.label().green().to_string(),
        ReadyStatus::NotReady => status.label().red().to_string(),
        ReadyStatus::Unknown => status.label().yellow().to_string(),
    }
}

/// Standard resource listing. STATUS is last so color codes never skew the
/// column widths.
pub fn print_resources(records: &[ResourceRecord], color: bool) {
    let rows = records
        .iter()
        .map(|r| {
            vec![
                truncate(&r.name, 40),
                r.namespace.clone(),
                r.kind.clone(),
                r.provider.clone(),
                if r.age.is_empty() { "-".to_string() } else { r.age.clone() },
                status_label(r.status, color),
            ]
        })
        .collect();
    print_table(&["NAME", "NAMESPACE", "KIND", "PROVIDER", "AGE", "STATUS"], rows);
}
