//! Plain-text and JSON rendering of store output.

use employee_core::{Employee, SalarySummary};
use serde_json::json;

const LABEL_WIDTH: usize = 16;

/// The statistics block, one labelled line per value.
pub fn stats_table(summary: &SalarySummary) -> String {
    let lines = [
        ("Employee Count", summary.count.to_string()),
        ("Min Salary", currency(summary.min)),
        ("Average Salary", currency(summary.average)),
        ("Max Salary", currency(summary.max)),
        ("Salary Sum", currency(summary.sum)),
    ];
    lines
        .iter()
        .map(|(label, value)| info_line(label, value))
        .collect()
}

/// One line per employee: type label and salary.
pub fn employee_lines(employees: &[Employee]) -> String {
    employees
        .iter()
        .map(|employee| info_line(&employee.kind, &currency(employee.salary)))
        .collect()
}

pub fn stats_json(summary: &SalarySummary, groups: &[(String, SalarySummary)]) -> String {
    let by_type: serde_json::Map<String, serde_json::Value> = groups
        .iter()
        .map(|(kind, group)| (kind.clone(), json!(group)))
        .collect();
    json!({ "summary": summary, "by_type": by_type }).to_string()
}

pub fn employees_json(employees: &[Employee]) -> String {
    json!(employees).to_string()
}

fn info_line(label: &str, value: &str) -> String {
    let label = format!("{label}:");
    let width = LABEL_WIDTH;
    format!("{label:<width$} {value:>16}\n")
}

/// US-dollar style amount with thousands separators and two decimals.
fn currency(value: f64) -> String {
    let rendered = format!("{:.2}", value.abs());
    let (whole, cents) = match rendered.split_once('.') {
        Some(parts) => parts,
        None => (rendered.as_str(), "00"),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::{currency, employee_lines, stats_json, stats_table};
    use employee_core::{Employee, SalarySummary};
    use uuid::Uuid;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(currency(0.0), "$0.00");
        assert_eq!(currency(999.5), "$999.50");
        assert_eq!(currency(60_000.0), "$60,000.00");
        assert_eq!(currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(currency(-1_500.0), "-$1,500.00");
    }

    #[test]
    fn stats_table_lists_values_in_screen_order() {
        let table = stats_table(&SalarySummary {
            count: 2,
            min: 60_000.0,
            max: 80_000.0,
            average: 70_000.0,
            sum: 140_000.0,
        });
        let labels: Vec<&str> = table
            .lines()
            .map(|line| line.split(':').next().unwrap())
            .collect();
        assert_eq!(
            labels,
            [
                "Employee Count",
                "Min Salary",
                "Average Salary",
                "Max Salary",
                "Salary Sum",
            ]
        );
        assert!(table.contains("$140,000.00"));
    }

    #[test]
    fn employee_lines_use_type_label() {
        let employees = [Employee {
            id: Uuid::new_v4(),
            kind: "Employee".to_string(),
            salary: 72_500.25,
        }];
        let rendered = employee_lines(&employees);
        assert!(rendered.starts_with("Employee:"));
        assert!(rendered.trim_end().ends_with("$72,500.25"));
    }

    #[test]
    fn stats_json_nests_groups_by_type() {
        let summary = SalarySummary {
            count: 1,
            ..SalarySummary::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&stats_json(&summary, &[("Employee".to_string(), summary)]))
                .unwrap();
        assert_eq!(value["summary"]["count"], 1);
        assert_eq!(value["by_type"]["Employee"]["count"], 1);
    }
}
