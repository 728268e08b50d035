//! Print stored results.

use console::style;

use adstream::config::Settings;
use adstream::storage::{csv_path, parse_csv};

use super::super::helpers::print_results_table;

pub async fn cmd_results(settings: &Settings, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let name = name.unwrap_or(&settings.dataset);
    let results = parse_csv(&settings.data_dir, name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!(
        "\n{} {}",
        style("Results").bold(),
        style(csv_path(&settings.data_dir, name).display()).dim()
    );
    if results.is_empty() {
        println!("{} No results stored", style("!").yellow());
        return Ok(());
    }

    print_results_table(&results);

    Ok(())
}
