//! Terminal output utilities

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Echo a value supplied via flag the same way a completed prompt looks
pub fn answered(label: &str, value: &str) {
    println!(
        "{} {} {}",
        style("✓").green().bold(),
        style(format!("{}:", label)).cyan(),
        style(value).green().bright()
    );
}

/// Create a spinner
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .expect("spinner template is valid")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// The startup banner
pub fn banner() {
    println!();
    println!("            {}", style("I G N I T E ⚡ K V").blue().bold());
    println!(
        "  {}",
        style("Run [ ignitekv -h ] for help").magenta().bright()
    );
    println!("  {}", style("almodheshplus/ignitekv").yellow().bright());
    println!();
}
