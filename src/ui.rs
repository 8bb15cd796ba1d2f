use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::fmt::Write;
use std::time::Duration;

// RGB tuples for the `colored` crate's `.truecolor()`
pub mod rgb {
    pub const ELECTRIC_PURPLE: (u8, u8, u8) = (225, 53, 255);
    pub const NEON_CYAN: (u8, u8, u8) = (128, 255, 234);
    pub const DIM_WHITE: (u8, u8, u8) = (180, 180, 190);
}

static QUIET_MODE: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));

pub fn set_quiet_mode(enabled: bool) {
    *QUIET_MODE.lock() = enabled;
}

pub fn is_quiet_mode() -> bool {
    *QUIET_MODE.lock()
}

/// Spinner on stderr; hidden in quiet mode
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("✦✧✶✷✸✹✺✻✼✽")
        .template("{spinner} {msg} {elapsed:.dim}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_info(message: &str) {
    if !is_quiet_mode() {
        eprintln!("{}", message.cyan().bold());
    }
}

pub fn print_warning(message: &str) {
    if !is_quiet_mode() {
        eprintln!("{}", message.yellow().bold());
    }
}

pub fn print_error(message: &str) {
    // Errors are shown even in quiet mode
    eprintln!("{}", message.red().bold());
}

/// The report itself always goes to stdout
pub fn print_report(report: &str) {
    print!("{report}");
    if !report.ends_with('\n') {
        println!();
    }
}

pub fn print_version(version: &str) {
    if !is_quiet_mode() {
        println!(
            "{} {} {}",
            create_gradient_text("Insight Agents"),
            "version".cyan(),
            version.green()
        );
    }
}

/// Text shaded from electric purple to neon cyan
pub fn create_gradient_text(text: &str) -> String {
    let gradient = [
        rgb::ELECTRIC_PURPLE,
        (200, 100, 255),
        (180, 150, 250),
        (150, 200, 245),
        rgb::NEON_CYAN,
    ];
    apply_gradient(text, &gradient)
}

/// Secondary text colour for listings
pub fn dim(text: &str) -> String {
    let (r, g, b) = rgb::DIM_WHITE;
    text.truecolor(r, g, b).to_string()
}

fn apply_gradient(text: &str, gradient: &[(u8, u8, u8)]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let chars_len = chars.len();
    let mut result = String::new();

    if chars_len == 0 || gradient.is_empty() {
        return result;
    }

    for (i, c) in chars.iter().enumerate() {
        let index = if chars_len == 1 {
            0
        } else {
            i * (gradient.len() - 1) / (chars_len - 1)
        };
        let (r, g, b) = gradient[index];
        let _ = write!(result, "{}", c.to_string().truecolor(r, g, b));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(create_gradient_text("Insight"), "Insight");
        assert_eq!(create_gradient_text(""), "");
        colored::control::unset_override();
    }
}
