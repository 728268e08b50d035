//! Collection command.

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use adstream::browser::ChromeLauncher;
use adstream::collector::Collector;
use adstream::config::{normalize_domains, Settings};
use adstream::models::AnalysisResult;
use adstream::storage::export_to_csv;

use super::super::helpers::print_results_table;

/// Analyze domains and write the results to `{data_dir}/{dataset}.csv`.
pub async fn cmd_collect(
    settings: &Settings,
    domains: &[String],
    output: Option<&str>,
) -> anyhow::Result<()> {
    let domains = if domains.is_empty() {
        settings.domains.clone()
    } else {
        normalize_domains(domains)
    };
    if domains.is_empty() {
        println!("{} No domains to analyze", style("!").yellow());
        return Ok(());
    }
    let dataset = output.unwrap_or(&settings.dataset);

    let collector = Collector::new(settings.collector_options());
    println!(
        "{} Analyzing {} domains ({} at a time, {}s timeout)",
        style("→").cyan(),
        domains.len(),
        collector.concurrency(),
        settings.navigation_timeout
    );

    let pb = ProgressBar::new(domains.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let launcher = ChromeLauncher::new(settings.browser.clone());
    let results = collector
        .run_with_progress(&launcher, &domains, |result| {
            pb.set_message(result.domain.clone());
            pb.inc(1);
        })
        .await
        .context("Failed to start browser")?;
    pb.finish_and_clear();

    let path = export_to_csv(&settings.data_dir, dataset, &results)?;

    print_summary(&results);
    println!(
        "\n{} Saved {} results to {}",
        style("✓").green(),
        results.len(),
        path.display()
    );

    Ok(())
}

fn print_summary(results: &[AnalysisResult]) {
    println!("\n{}", style("Results").bold());
    print_results_table(results);

    let streaming = results.iter().filter(|r| r.has_streaming).count();
    let ads = results.iter().filter(|r| r.has_ads).count();
    let failed = results.iter().filter(|r| r.is_failure()).count();
    println!("{}", "-".repeat(72));
    println!(
        "{} streaming, {} with ads, {} failed",
        style(streaming).green(),
        style(ads).green(),
        if failed > 0 {
            style(failed).red()
        } else {
            style(failed).dim()
        }
    );
}
