//! Domain list command.

use console::style;

use adstream::config::Settings;

pub async fn cmd_domains(settings: &Settings) -> anyhow::Result<()> {
    if settings.domains.is_empty() {
        println!("{} No domains configured", style("!").yellow());
        return Ok(());
    }

    println!(
        "\n{} ({})",
        style("Configured domains").bold(),
        settings.domains.len()
    );
    for domain in &settings.domains {
        println!("  {}", domain);
    }
    Ok(())
}
