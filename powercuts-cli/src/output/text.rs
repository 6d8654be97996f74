//! Text output formatting with colors.

use chrono::Local;
use powercuts_fetch::{ProbeOutcome, ProbeResult};
use powercuts_sensors::{EntityState, SensorValue};
use powercuts_store::Settings;

use crate::monitor::EntryReport;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Width of the sensor name column.
const NAME_WIDTH: usize = 48;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats one entry's refresh report.
    pub fn format_report(&self, report: &EntryReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} {}",
            self.bold(&report.title),
            self.dim(&format!("({})", report.entry_id))
        ));
        lines.push(self.format_count(report.power_cuts));

        if report.last_update_success {
            if let Some(updated) = report.last_updated {
                let local = updated.with_timezone(&Local);
                lines.push(self.dim(&format!("Updated {}", local.format("%H:%M:%S"))));
            }
        } else {
            let error = report.error.as_deref().unwrap_or("Update failed");
            lines.push(format!(
                "{} {}",
                self.red(error),
                self.dim("(showing last known data)")
            ));
        }

        lines.push(String::new());
        lines.extend(report.entities.iter().map(|e| self.format_entity(e)));

        lines.join("\n")
    }

    fn format_count(&self, count: usize) -> String {
        match count {
            0 => self.green("No active power cuts"),
            1 => self.red("1 active power cut"),
            n => self.red(&format!("{n} active power cuts")),
        }
    }

    /// Formats one sensor line.
    pub fn format_entity(&self, entity: &EntityState) -> String {
        let value = if !entity.available {
            self.dim("unavailable")
        } else {
            match &entity.state {
                Some(SensorValue::Text(s)) => s.clone(),
                Some(SensorValue::Integer(n)) => n.to_string(),
                None => self.dim("unknown"),
            }
        };

        format!("  {:<width$} {}", entity.name, value, width = NAME_WIDTH)
    }

    /// Formats a probe result.
    pub fn format_probe(&self, endpoint: &str, result: &ProbeResult) -> String {
        let status = match &result.outcome {
            ProbeOutcome::Reachable => {
                format!("{} Reachable ({} ms)", self.green("✓"), result.response_time_ms)
            }
            ProbeOutcome::BadStatus(code) => {
                format!("{} HTTP {code}", self.yellow("✗"))
            }
            ProbeOutcome::Unreachable(reason) | ProbeOutcome::Unexpected(reason) => {
                format!("{} {}", self.red("✗ Not reachable:"), reason)
            }
        };

        format!("{}\n{}", self.dim(endpoint), status)
    }

    /// Formats settings.
    pub fn format_settings(&self, settings: &Settings) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold("powercuts Configuration"));
        lines.push("─".repeat(40));
        lines.push(String::new());

        if settings.entries.is_empty() {
            lines.push(self.dim("No postcodes configured"));
        } else {
            lines.push("Entries:".to_string());
            for entry in &settings.entries {
                lines.push(format!(
                    "  • {} {} {} ({})",
                    entry.entry_id,
                    self.dim("→"),
                    entry.postcode(),
                    entry.name()
                ));
            }
        }

        lines.push(String::new());
        lines.push(format!("Endpoint:        {}", settings.endpoint));
        lines.push(format!("Scan interval:   {}s", settings.scan_interval_secs));
        lines.push(format!("Request timeout: {}s", settings.request_timeout_secs));
        lines.push(format!("Log level:       {}", settings.log_level));

        lines.join("\n")
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }
}
