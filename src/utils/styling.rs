//! Terminal styling utilities for the pipeline console output

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SCALE: Emoji<'_, '_> = Emoji("⚖️  ", "");
pub static DICE: Emoji<'_, '_> = Emoji("🎲 ", "");

/// Print the application banner with ASCII art
pub fn print_banner(version: &str) {
    let banner = r#"
     ██████╗ ██████╗ ██████╗ ███████╗██████╗  ██████╗ █████╗ ███████╗████████╗
    ██╔═══██╗██╔══██╗██╔══██╗██╔════╝██╔══██╗██╔════╝██╔══██╗██╔════╝╚══██╔══╝
    ██║   ██║██████╔╝██║  ██║█████╗  ██████╔╝██║     ███████║███████╗   ██║
    ██║   ██║██╔══██╗██║  ██║██╔══╝  ██╔══██╗██║     ██╔══██║╚════██║   ██║
    ╚██████╔╝██║  ██║██████╔╝███████╗██║  ██║╚██████╗██║  ██║███████║   ██║
     ╚═════╝ ╚═╝  ╚═╝╚═════╝ ╚══════╝╚═╝  ╚═╝ ╚═════╝╚═╝  ╚═╝╚══════╝   ╚═╝
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {} {}",
        style("◆").magenta().bold(),
        style("Order cancellation prediction").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(
    data_dir: &Path,
    seed: &str,
    test_fraction: f64,
    smote_ratio: f64,
    cv_folds: usize,
) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Data dir: {:<37}│",
        FOLDER,
        truncate_path(data_dir, 36)
    );
    println!("    │  {} Seed:     {:<37}│", DICE, truncate_string(seed, 36));
    println!("    ├{}┤", line);
    println!(
        "    │  {} Test fraction: {:<31}│",
        CHART,
        style(format!("{:.0}%", test_fraction * 100.0)).yellow()
    );
    println!(
        "    │  {} Minority ratio: {:<30}│",
        SCALE,
        style(format!("{:.2}", smote_ratio)).yellow()
    );
    println!(
        "    │  {} CV folds:       {:<30}│",
        TARGET,
        style(cv_folds).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, extra: Option<&str>) {
    if let Some(info) = extra {
        println!(
            "      {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      {} {}", style(count).yellow().bold(), description);
    }
}

/// Print the elapsed time of a step
pub fn print_step_time(elapsed: Duration) {
    println!(
        "      {}",
        style(format!("took {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Ordercast run complete!").green().bold()
    );
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - max_len + 3..].iter().collect();
        format!("...{}", tail)
    }
}
