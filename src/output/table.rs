use chrono::Utc;
use comfy_table::{Table, presets::NOTHING};

use super::ListResult;

pub struct TableFormatter;

impl TableFormatter {
    pub fn format(result: &ListResult, no_headers: bool) -> String {
        if result.items.is_empty() {
            return "No resources found.".to_string();
        }

        let rows = result.rows(Utc::now());
        // Namespace column only when the listing spanned namespaces
        let show_namespace = result.unscoped && rows.iter().any(|r| r.namespace.is_some());

        let mut table = Table::new();
        // kubectl-style: no borders, columns separated by spaces
        table.load_preset(NOTHING);

        if !no_headers {
            let mut header = Vec::with_capacity(3);
            if show_namespace {
                header.push("NAMESPACE");
            }
            header.extend(["NAME", "AGE"]);
            table.set_header(header);
        }

        for row in rows {
            let mut cells = Vec::with_capacity(3);
            if show_namespace {
                cells.push(row.namespace.unwrap_or_default());
            }
            cells.push(row.name);
            cells.push(row.age);
            table.add_row(cells);
        }

        table.to_string()
    }
}
