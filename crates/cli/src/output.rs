//! Output formatting for CLI

use std::time::Duration;

use colored::Colorize;

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "!".yellow(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "•".blue(), message);
}

/// Announce a task, the way task runners do
pub fn print_task_started(task: &str) {
    println!("Starting '{}'...", task.cyan());
}

pub fn print_task_finished(task: &str, elapsed: Duration) {
    println!("Finished '{}' after {}", task.cyan(), format_elapsed(elapsed).magenta());
}

/// Human-scaled duration: `340 ms`, `2.41 s`, `1 min 5 s`
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 1000 {
        format!("{} ms", ms)
    } else if ms < 60_000 {
        format!("{:.2} s", elapsed.as_secs_f64())
    } else {
        let secs = elapsed.as_secs();
        format!("{} min {} s", secs / 60, secs % 60)
    }
}
