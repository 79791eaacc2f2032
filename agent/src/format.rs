//! Terminal rendering of query results

use crate::db::QueryOutput;

/// Render one query output as user-facing text
pub fn render(output: &QueryOutput) -> String {
    match output {
        QueryOutput::Rows { columns, rows } => render_rows(columns, rows),
        QueryOutput::Affected(count) => render_affected(*count),
    }
}

/// Render an affected-row count; zero rows is still a successful outcome
pub fn render_affected(count: u64) -> String {
    if count == 0 {
        "No rows affected.".to_string()
    } else {
        format!("{} record(s) affected.", count)
    }
}

fn render_rows(columns: &[String], rows: &[Vec<serde_json::Value>]) -> String {
    if rows.is_empty() {
        return "No matching records.".to_string();
    }

    let mut out = format!("Found {} record(s):\n", rows.len());
    out.push_str(&"-".repeat(50));
    out.push('\n');

    for (i, row) in rows.iter().enumerate() {
        let fields: Vec<String> = columns
            .iter()
            .zip(row.iter())
            .map(|(name, value)| format!("{}: {}", name, render_value(value)))
            .collect();
        out.push_str(&format!("{}. {}\n", i + 1, fields.join(" | ")));
    }

    out
}

/// Render a single cell without JSON quoting noise
fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn employee_columns() -> Vec<String> {
        ["id", "name", "role", "department", "salary", "hire_date"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn listing_shows_every_row_with_all_columns() {
        let output = QueryOutput::Rows {
            columns: employee_columns(),
            rows: vec![
                vec![
                    json!(1),
                    json!("Alice"),
                    json!("Engineer"),
                    json!("engineering"),
                    json!(95000),
                    json!("2021-03-01"),
                ],
                vec![
                    json!(2),
                    json!("Bob"),
                    json!("Engineer"),
                    json!("engineering"),
                    json!(87000),
                    json!("2022-07-15"),
                ],
                vec![
                    json!(3),
                    json!("Carol"),
                    json!("Manager"),
                    json!("engineering"),
                    json!(110000),
                    json!("2019-01-20"),
                ],
            ],
        };

        let text = render(&output);
        assert!(text.starts_with("Found 3 record(s):\n"));
        assert!(text.contains("1. id: 1 | name: Alice | role: Engineer | department: engineering | salary: 95000 | hire_date: 2021-03-01"));
        assert!(text.contains("2. id: 2 | name: Bob"));
        assert!(text.contains("3. id: 3 | name: Carol"));
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let output = QueryOutput::Rows {
            columns: Vec::new(),
            rows: Vec::new(),
        };
        assert_eq!(render(&output), "No matching records.");
    }

    #[test]
    fn affected_counts_read_as_success() {
        assert_eq!(render(&QueryOutput::Affected(2)), "2 record(s) affected.");
        assert_eq!(render(&QueryOutput::Affected(0)), "No rows affected.");
    }

    #[test]
    fn cells_render_without_json_quoting() {
        assert_eq!(render_value(&json!(null)), "NULL");
        assert_eq!(render_value(&json!("plain")), "plain");
        assert_eq!(render_value(&json!(42)), "42");
        assert_eq!(render_value(&json!(9.5)), "9.5");
    }
}
