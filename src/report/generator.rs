//! Report rendering.
//!
//! This module renders single analyses and range reports as plain text,
//! Markdown or JSON.

use crate::models::{RangeReport, RangeSummary, ReportMetadata, SequenceAnalysis};
use anyhow::Result;
use serde::Serialize;

/// Generate a complete Markdown range report.
pub fn generate_markdown_report(report: &RangeReport) -> String {
    let mut output = String::new();

    output.push_str("# Collatz Range Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_sequences_section(&report.results));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Range:** {}..={}\n",
        metadata.range_start, metadata.range_end
    ));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    match metadata.max_iterations {
        Some(limit) => section.push_str(&format!("- **Iteration Cap:** {}\n", limit)),
        None => section.push_str("- **Iteration Cap:** unbounded\n"),
    }
    if metadata.skipped > 0 {
        section.push_str(&format!("- **Skipped Numbers:** {}\n", metadata.skipped));
    }
    section.push_str(&format!(
        "- **Analysis Duration:** {:.3}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &RangeSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    if summary.total_sequences == 0 {
        section.push_str("No numbers in this range could be analyzed.\n\n");
        return section;
    }

    section.push_str("| Sequences | Avg Length | Min Length | Max Length | Avg Peak |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {:.2} | {} | {} | {:.2} |\n\n",
        summary.total_sequences,
        summary.avg_sequence_length,
        summary.min_sequence_length,
        summary.max_sequence_length,
        summary.avg_max_value
    ));

    if let Some(start) = summary.longest_starting_number {
        section.push_str(&format!(
            "- **Longest:** {} ({} elements)\n",
            start, summary.max_sequence_length
        ));
    }
    if let (Some(start), Some(peak)) = (summary.highest_peak_starting_number, summary.highest_peak)
    {
        section.push_str(&format!("- **Highest Peak:** {} (reaches {})\n", start, peak));
    }
    section.push('\n');

    section
}

/// Generate the per-number table.
fn generate_sequences_section(results: &[SequenceAnalysis]) -> String {
    let mut section = String::new();

    section.push_str("## Sequences\n\n");

    if results.is_empty() {
        section.push_str("No sequences.\n\n");
        return section;
    }

    section.push_str("| Start | Length | Max | Steps to Max | Even | Odd | Growth |\n");
    section.push_str("|---:|---:|---:|---:|---:|---:|---:|\n");

    for analysis in results {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {:.2} |\n",
            analysis.starting_number,
            analysis.length,
            analysis.max_value,
            analysis.steps_to_max,
            analysis.even_count,
            analysis.odd_count,
            analysis.growth_factor
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by collatz-stats*\n".to_string()
}

/// Generate a plain-text range report.
pub fn generate_text_report(report: &RangeReport) -> String {
    let summary = &report.summary;
    let mut lines = Vec::new();

    lines.push(format!(
        "Range {}..={}: {} sequences analyzed",
        report.metadata.range_start, report.metadata.range_end, summary.total_sequences
    ));
    if report.metadata.skipped > 0 {
        lines.push(format!("Skipped: {}", report.metadata.skipped));
    }

    if summary.total_sequences > 0 {
        lines.push(format!(
            "Length: avg {:.2}, min {}, max {}",
            summary.avg_sequence_length, summary.min_sequence_length, summary.max_sequence_length
        ));
        lines.push(format!("Average peak: {:.2}", summary.avg_max_value));
        if let Some(start) = summary.longest_starting_number {
            lines.push(format!("Longest: {}", start));
        }
        if let (Some(start), Some(peak)) =
            (summary.highest_peak_starting_number, summary.highest_peak)
        {
            lines.push(format!("Highest peak: {} (reaches {})", start, peak));
        }

        lines.push(String::new());
        for analysis in &report.results {
            lines.push(format!(
                "{:>8}  length={:<5} max={:<12} steps_to_max={}",
                analysis.starting_number,
                analysis.length,
                analysis.max_value,
                analysis.steps_to_max
            ));
        }
    }

    lines.join("\n") + "\n"
}

/// Render a single analysis as plain text.
pub fn render_analysis_text(analysis: &SequenceAnalysis) -> String {
    let mut lines = vec![
        format!("Starting number: {}", analysis.starting_number),
        format!("Length:          {}", analysis.length),
        format!("Max value:       {}", analysis.max_value),
        format!("Steps to max:    {}", analysis.steps_to_max),
        format!("Stopping time:   {}", analysis.stopping_time()),
        format!(
            "Even / odd:      {} / {}",
            analysis.even_count, analysis.odd_count
        ),
        format!("Power of two:    {}", analysis.is_power_of_two),
        format!("Growth factor:   {:.4}", analysis.growth_factor),
    ];

    lines.push(format!(
        "Sequence:        {}",
        analysis
            .sequence
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    ));

    lines.join("\n") + "\n"
}

/// Render a single analysis as Markdown.
pub fn render_analysis_markdown(analysis: &SequenceAnalysis) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Collatz Sequence for {}\n\n", analysis.starting_number));
    output.push_str("| Statistic | Value |\n");
    output.push_str("|:---|---:|\n");
    output.push_str(&format!("| Length | {} |\n", analysis.length));
    output.push_str(&format!("| Max value | {} |\n", analysis.max_value));
    output.push_str(&format!("| Steps to max | {} |\n", analysis.steps_to_max));
    output.push_str(&format!("| Stopping time | {} |\n", analysis.stopping_time()));
    output.push_str(&format!("| Even count | {} |\n", analysis.even_count));
    output.push_str(&format!("| Odd count | {} |\n", analysis.odd_count));
    output.push_str(&format!("| Power of two | {} |\n", analysis.is_power_of_two));
    output.push_str(&format!("| Growth factor | {:.4} |\n\n", analysis.growth_factor));

    output.push_str("## Sequence\n\n```\n");
    for chunk in analysis.sequence.chunks(10) {
        let row: Vec<String> = chunk.iter().map(u64::to_string).collect();
        output.push_str(&row.join(", "));
        output.push('\n');
    }
    output.push_str("```\n");

    output
}

/// Serialize any result as pretty JSON.
pub fn generate_json_report<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
