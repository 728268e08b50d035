//! Shared helper functions for CLI commands.

use console::style;

use adstream::models::AnalysisResult;

/// Truncate a string to max characters with ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Colored yes/no cell for a detection flag, left-aligned to `width`.
pub fn flag(value: bool, width: usize) -> String {
    // Pad before styling: ANSI codes would throw off the column width.
    if value {
        style(format!("{:<width$}", "yes")).green().to_string()
    } else {
        style(format!("{:<width$}", "no")).dim().to_string()
    }
}

/// Print results as a fixed-width table.
pub fn print_results_table(results: &[AnalysisResult]) {
    println!("{}", "-".repeat(72));
    println!("{:<28} {:<10} {:<6} Error", "Domain", "Streaming", "Ads");
    println!("{}", "-".repeat(72));

    for result in results {
        println!(
            "{:<28} {} {} {}",
            truncate(&result.domain, 27),
            flag(result.has_streaming, 10),
            flag(result.has_ads, 6),
            style(truncate(result.error.as_deref().unwrap_or(""), 40)).red()
        );
    }
}
