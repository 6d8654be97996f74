//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use crate::monitor::EntryReport;
    use powercuts_core::{CoordinatorSnapshot, OutageRecord, OutageSet};
    use powercuts_fetch::{ProbeOutcome, ProbeResult};
    use powercuts_sensors::{EntityRegistry, SensorContext};
    use powercuts_store::{ConfigEntry, Settings};

    fn report(success: bool) -> EntryReport {
        let mut snapshot = CoordinatorSnapshot::with_data(OutageSet::new(vec![OutageRecord {
            reference: Some("INCD-1".into()),
            postcode: Some("NE1 1AA".into()),
            total_confirmed_power_cut: Some(12),
            ..OutageRecord::default()
        }]));
        if !success {
            snapshot.last_update_success = false;
            snapshot.last_error = Some("Error communicating with API: HTTP status 503".into());
        }

        let registry = EntityRegistry::setup(SensorContext::new("ne11aa", "Home", "NE1 1AA"), &snapshot);
        EntryReport {
            entry_id: "ne11aa".into(),
            title: "Northern Powergrid NE1 1AA".into(),
            postcode: "NE1 1AA".into(),
            power_cuts: snapshot.len(),
            last_update_success: snapshot.last_update_success,
            last_updated: snapshot.last_updated,
            error: snapshot.last_error.clone(),
            entities: registry.render(&snapshot),
        }
    }

    #[test]
    fn test_report_lists_every_sensor() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_report(&report(true));

        assert!(output.starts_with("Northern Powergrid NE1 1AA (ne11aa)"));
        assert!(output.contains("1 active power cut"));
        assert!(output.contains("Home power_cut_1 Reference"));
        assert!(output.contains("INCD-1"));
        assert!(output.contains("Home Latest Event"));
        // Count, seven fields, latest event
        assert_eq!(output.lines().filter(|l| l.starts_with("  ")).count(), 9);
    }

    #[test]
    fn test_failed_report_shows_error_and_unavailable() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_report(&report(false));

        assert!(output.contains("Error communicating with API"));
        assert!(output.contains("showing last known data"));
        assert!(output.contains("unavailable"));
    }

    #[test]
    fn test_no_colors_means_no_escape_codes() {
        let output = TextFormatter::new(false).format_report(&report(true));
        assert!(!output.contains('\x1b'));

        let colored = TextFormatter::new(true).format_report(&report(true));
        assert!(colored.contains("\x1b[31m"));
    }

    #[test]
    fn test_probe_output() {
        let formatter = TextFormatter::new(false);
        let ok = ProbeResult {
            outcome: ProbeOutcome::Reachable,
            response_time_ms: 87,
            status_code: Some(200),
        };
        assert!(formatter.format_probe("https://x", &ok).contains("Reachable (87 ms)"));

        let bad = ProbeResult {
            outcome: ProbeOutcome::BadStatus(503),
            response_time_ms: 12,
            status_code: Some(503),
        };
        assert!(formatter.format_probe("https://x", &bad).contains("HTTP 503"));
    }

    #[test]
    fn test_settings_output() {
        let settings = Settings {
            entries: vec![ConfigEntry::new("NE1 1AA", "Home")],
            ..Settings::default()
        };
        let output = TextFormatter::new(false).format_settings(&settings);
        assert!(output.contains("ne11aa → NE1 1AA (Home)"));
        assert!(output.contains("Scan interval:   900s"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use crate::monitor::EntryReport;
    use powercuts_fetch::{ProbeOutcome, ProbeResult};

    fn empty_report(entry_id: &str) -> EntryReport {
        EntryReport {
            entry_id: entry_id.into(),
            title: "t".into(),
            postcode: "NE1 1AA".into(),
            power_cuts: 0,
            last_update_success: true,
            last_updated: None,
            error: None,
            entities: Vec::new(),
        }
    }

    #[test]
    fn test_single_report_is_object() {
        let formatter = JsonFormatter::new(false);
        let json = formatter.format_reports(&[empty_report("a")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value.is_object());
        assert_eq!(value["entry_id"], "a");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_multiple_reports_are_array() {
        let formatter = JsonFormatter::new(true);
        let json = formatter
            .format_reports(&[empty_report("a"), empty_report("b")])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_probe_json() {
        let formatter = JsonFormatter::new(false);
        let result = ProbeResult {
            outcome: ProbeOutcome::Unreachable("connection refused".into()),
            response_time_ms: 3,
            status_code: None,
        };
        let value: serde_json::Value =
            serde_json::from_str(&formatter.format_probe("https://x", &result).unwrap()).unwrap();

        assert_eq!(value["reachable"], false);
        assert_eq!(value["error"], "connection refused");
        assert!(value.get("status_code").is_none());
    }
}
