//! Table formatting for CLI command output, using comfy-table. Grounded on
//! the teacher's `cli::output::table::TableFormatter`: bold headers,
//! color-coded status cells, a base table builder shared across commands.

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::domain::models::execution_record::{ExecutionOutcome, ExecutionRecord, RequestStatus};
use crate::domain::models::metrics::MetricsSnapshot;
use crate::domain::models::pattern::Pattern;
use crate::domain::models::strategy::StrategyRecommendation;
use crate::domain::models::task_analysis::TaskAnalysis;
use crate::services::CapabilitiesSummary;

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn status_color(status: RequestStatus) -> Color {
    match status {
        RequestStatus::Completed => Color::Green,
        RequestStatus::Error => Color::Red,
        _ => Color::Yellow,
    }
}

pub fn execution_record(record: &ExecutionRecord) -> String {
    let mut table = base_table();
    table.set_header(vec![
        Cell::new("field").add_attribute(Attribute::Bold),
        Cell::new("value").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("id"), Cell::new(record.id.to_string())]);
    table.add_row(vec![Cell::new("request"), Cell::new(&record.request_text)]);
    table.add_row(vec![
        Cell::new("status"),
        Cell::new(format!("{:?}", record.status)).fg(status_color(record.status)),
    ]);
    if let Some(pattern) = record.recommendation.as_ref().map(|r| r.pattern) {
        table.add_row(vec![Cell::new("pattern"), Cell::new(pattern.as_str())]);
    }
    table.add_row(vec![
        Cell::new("providers used"),
        Cell::new(record.providers_used.join(", ")),
    ]);
    table.add_row(vec![
        Cell::new("roles used"),
        Cell::new(record.roles_used.join(", ")),
    ]);
    if let Some(ms) = record.elapsed_ms() {
        table.add_row(vec![Cell::new("elapsed (ms)"), Cell::new(ms.to_string())]);
    }
    match &record.result {
        Some(ExecutionOutcome::Success(output)) => {
            table.add_row(vec![Cell::new("result"), Cell::new(truncate(output, 400))]);
        }
        Some(ExecutionOutcome::Failure(message)) => {
            table.add_row(vec![
                Cell::new("error").fg(Color::Red),
                Cell::new(message),
            ]);
        }
        None => {}
    }
    table.to_string()
}

pub fn analysis(analysis: &TaskAnalysis, recommendation: &StrategyRecommendation) -> String {
    let mut table = base_table();
    table.set_header(vec![
        Cell::new("field").add_attribute(Attribute::Bold),
        Cell::new("value").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("task type"), Cell::new(analysis.task_type.as_str())]);
    table.add_row(vec![Cell::new("complexity"), Cell::new(analysis.complexity.as_str())]);
    table.add_row(vec![
        Cell::new("capabilities"),
        Cell::new(
            analysis
                .required_capabilities
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ),
    ]);
    table.add_row(vec![
        Cell::new("estimated steps"),
        Cell::new(analysis.estimated_steps.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("confidence"),
        Cell::new(format!("{:.2}", analysis.confidence)),
    ]);
    table.add_row(vec![
        Cell::new("recommended pattern").add_attribute(Attribute::Bold),
        Cell::new(recommendation.pattern.as_str()).fg(Color::Cyan),
    ]);
    table.add_row(vec![Cell::new("reasoning"), Cell::new(&recommendation.reasoning)]);
    table.add_row(vec![
        Cell::new("estimated time (s)"),
        Cell::new(recommendation.estimated_execution_time_s.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("fallbacks"),
        Cell::new(
            recommendation
                .fallback_patterns
                .iter()
                .map(Pattern::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
    ]);
    table.to_string()
}

pub fn capabilities(summary: &CapabilitiesSummary) -> String {
    let mut table = base_table();
    table.set_header(vec![
        Cell::new("providers").add_attribute(Attribute::Bold),
        Cell::new("role templates").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new(format!("{} known", summary.provider_count)),
        Cell::new(summary.specializations.len().to_string()),
    ]);
    let mut names = base_table();
    names.set_header(vec![Cell::new("provider name").add_attribute(Attribute::Bold)]);
    for name in &summary.provider_names {
        names.add_row(vec![Cell::new(name)]);
    }
    let mut templates = base_table();
    templates.set_header(vec![Cell::new("template").add_attribute(Attribute::Bold)]);
    for name in &summary.specializations {
        templates.add_row(vec![Cell::new(*name)]);
    }
    format!("{table}\n\n{names}\n\n{templates}")
}

pub fn metrics(snapshot: &MetricsSnapshot) -> String {
    let mut summary = base_table();
    summary.set_header(vec![
        Cell::new("metric").add_attribute(Attribute::Bold),
        Cell::new("value").add_attribute(Attribute::Bold),
    ]);
    summary.add_row(vec![
        Cell::new("total requests"),
        Cell::new(snapshot.total_requests.to_string()),
    ]);
    summary.add_row(vec![
        Cell::new("successful requests"),
        Cell::new(snapshot.successful_requests.to_string()),
    ]);
    summary.add_row(vec![
        Cell::new("analysis cache hit rate"),
        Cell::new(format!("{:.2}", snapshot.analysis_cache.hit_rate())),
    ]);
    summary.add_row(vec![
        Cell::new("strategy cache hit rate"),
        Cell::new(format!("{:.2}", snapshot.strategy_cache.hit_rate())),
    ]);

    let mut per_pattern = base_table();
    per_pattern.set_header(vec![
        Cell::new("pattern").add_attribute(Attribute::Bold),
        Cell::new("total").add_attribute(Attribute::Bold),
        Cell::new("success rate").add_attribute(Attribute::Bold),
        Cell::new("avg time (s)").add_attribute(Attribute::Bold),
    ]);
    for pattern in Pattern::CANONICAL_ORDER {
        if let Some(stats) = snapshot.per_pattern.get(&pattern) {
            per_pattern.add_row(vec![
                Cell::new(pattern.as_str()),
                Cell::new(stats.total.to_string()),
                Cell::new(format!("{:.2}", stats.success_rate)),
                Cell::new(format!("{:.1}", stats.avg_execution_time_s)),
            ]);
        }
    }

    format!("{summary}\n\n{per_pattern}")
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        text.to_string()
    } else {
        format!("{}...", &text[..max_len])
    }
}
