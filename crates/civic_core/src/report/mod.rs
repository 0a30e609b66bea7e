use crate::cache::corpus_fingerprint;
use crate::catalog::CityReference;
use crate::domain::{Issue, Priority, Status};
use crate::stats::{category_stats, city_stats, department_performance, overview, rounded_pct};
use crate::view::{sort_and_filter, ViewOptions};

const URGENT_ROWS: usize = 10;

fn pct(part: i64, total: i64) -> String {
    rounded_pct(part, total)
        .map(|p| format!("{p}%"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Deterministic Markdown summary of `issues`.
///
/// Ordering follows catalog order for categories, departments and cities, so the output only
/// changes when the corpus does.
pub fn render_markdown_report(issues: &[Issue], cities: &[CityReference]) -> String {
    let totals = overview(issues, None);
    let mut out = String::new();

    out.push_str("# Civic Issue Report\n\n");
    out.push_str(&format!(
        "Corpus fingerprint: `{}`\n\n",
        corpus_fingerprint(issues)
    ));

    out.push_str("## Overview\n\n");
    out.push_str(&format!("- Total issues: **{}**\n", totals.total));
    out.push_str(&format!("- Pending: **{}**\n", totals.pending));
    out.push_str(&format!("- In Progress: **{}**\n", totals.in_progress));
    out.push_str(&format!(
        "- Resolved: **{}** ({})\n",
        totals.resolved,
        pct(totals.resolved, totals.total)
    ));
    out.push_str(&format!(
        "- High urgency (High + Very High): **{}**\n\n",
        totals.high_urgency
    ));

    out.push_str("## Categories\n\n");
    out.push_str("| Category | Total |");
    for p in Priority::ALL {
        out.push_str(&format!(" {p} |"));
    }
    for s in Status::ALL {
        out.push_str(&format!(" {s} |"));
    }
    out.push('\n');
    out.push_str("|---|---:|");
    out.push_str(&"---:|".repeat(Priority::ALL.len() + Status::ALL.len()));
    out.push('\n');
    for (category, stats) in category_stats(issues) {
        out.push_str(&format!("| {category} | {} |", stats.total));
        for p in Priority::ALL {
            out.push_str(&format!(" {} |", stats.by_priority.get(&p).copied().unwrap_or(0)));
        }
        for s in Status::ALL {
            out.push_str(&format!(" {} |", stats.by_status.get(&s).copied().unwrap_or(0)));
        }
        out.push('\n');
    }
    out.push('\n');

    out.push_str("## Cities\n\n");
    out.push_str("| City | Total | Resolved | Resolved % |\n|---|---:|---:|---:|\n");
    for c in city_stats(issues, cities) {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_cell(&c.city),
            c.total_issues,
            c.resolved_issues,
            pct(c.resolved_issues, c.total_issues)
        ));
    }
    out.push('\n');

    out.push_str("## Departments\n\n");
    out.push_str("| Department | Total | Resolved | Resolved % |\n|---|---:|---:|---:|\n");
    for d in department_performance(issues) {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            d.department,
            d.total,
            d.resolved,
            pct(d.resolved, d.total)
        ));
    }
    out.push('\n');

    out.push_str("## Most urgent open issues\n\n");
    let open: Vec<Issue> = issues
        .iter()
        .filter(|i| i.status != Status::Resolved)
        .cloned()
        .collect();
    let view = sort_and_filter(&open, &ViewOptions::default());
    if view.issues.is_empty() {
        out.push_str("_No open issues._\n");
    } else {
        out.push_str("| ID | Priority | Category | Address | Reported |\n|---:|---|---|---|---|\n");
        for i in view.issues.iter().take(URGENT_ROWS) {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                i.id,
                i.priority,
                i.category,
                escape_cell(&i.address),
                crate::domain::calendar_date::format(i.reported_date)
            ));
        }
    }

    out
}
