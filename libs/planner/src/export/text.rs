//! Plain-text weekly report

use std::fmt::Write;

use crate::report::WeeklyReport;

pub fn render(report: &WeeklyReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "Weekly Training Report");
    let _ = writeln!(out, "{}", report.subtitle());

    for day in &report.days {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", day.title());
        if day.is_rest() {
            let _ = writeln!(out, "  Rest");
            continue;
        }
        for entry in &day.entries {
            let cells = entry.set_cells();
            if cells.is_empty() {
                let _ = writeln!(out, "  • {}", entry.name);
            } else {
                let _ = writeln!(out, "  • {}: {}", entry.name, cells.join(", "));
            }
        }
    }

    out
}
