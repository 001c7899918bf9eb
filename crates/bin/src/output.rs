//! Output formatting helpers for human-readable and JSON output.

use clap::ValueEnum;
use convergent::{CommitOutcome, NodeState};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Lay out `header` and `rows` as aligned columns.
///
/// Every column but the last is padded to its widest cell. No lines are
/// produced when there are no rows.
pub fn aligned<const N: usize>(header: [&str; N], rows: Vec<[String; N]>) -> Vec<String> {
    if rows.is_empty() {
        return Vec::new();
    }
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    std::iter::once(header.map(str::to_string))
        .chain(rows)
        .map(|row| {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i + 1 < N {
                    line.push_str(&format!("{cell:<width$}  ", width = widths[i]));
                } else {
                    line.push_str(cell);
                }
            }
            line.trim_end().to_string()
        })
        .collect()
}

fn property_lines(node: &NodeState) -> Vec<String> {
    let rows = node
        .properties()
        .map(|p| [p.name().to_string(), p.value().to_string()])
        .collect();
    aligned(["PROPERTY", "VALUE"], rows)
}

/// Report the result of a commit.
pub fn print_commit(
    outcome: &CommitOutcome,
    path: &str,
    detail: Option<&str>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => {
            if outcome.changed {
                print!("Committed revision {} at {path}", outcome.revision);
            } else {
                print!("Nothing changed at {path} (revision {})", outcome.revision);
            }
            match detail {
                Some(detail) => println!(": {detail}"),
                None => println!(),
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "path": path,
                "revision": outcome.revision,
                "changed": outcome.changed,
                "detail": detail,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}

/// Print one node: its properties, then the names of its children.
pub fn print_node(
    path: &str,
    node: &NodeState,
    revision: u64,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => {
            println!("Node:      {path}");
            println!("Revision:  {revision}");
            let lines = property_lines(node);
            if !lines.is_empty() {
                println!();
                for line in lines {
                    println!("{line}");
                }
            }
            let children: Vec<&str> = node.children().map(|(name, _)| name).collect();
            if !children.is_empty() {
                println!();
                println!("Children:  {}", children.join(", "));
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "path": path,
                "revision": revision,
                "node": node,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
