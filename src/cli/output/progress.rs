//! Progress/spinner utilities using indicatif, for the `execute` command's
//! long-running requests. Grounded on the teacher's
//! `cli::output::progress` module, trimmed to what this CLI actually uses.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner with an initial message, ticking until finished.
pub fn create_spinner_with_message(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .expect("invalid spinner template")
            .tick_chars(SPINNER_CHARS),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.into());
    spinner
}
