use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test harness with a throwaway schedules directory and notes graph
pub struct CliTestHarness {
    temp_dir: TempDir,
    config_path: PathBuf,
}

impl CliTestHarness {
    /// Create an empty workspace with a config pointing into it
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("schedules")).expect("Failed to create schedules dir");
        fs::create_dir_all(root.join("notes").join("pages")).expect("Failed to create notes dir");

        let config_path = root.join("seqcal.toml");
        let config = format!(
            "timezone = \"UTC\"\nschedules_dir = {:?}\nnotes_dir = {:?}\norganizer_name = \"Planner\"\norganizer_mail = \"planner@example.org\"\ntag_division = \"work:Werk|home:Thuis\"\n",
            root.join("schedules"),
            root.join("notes"),
        );
        fs::write(&config_path, config).expect("Failed to write config");

        Self {
            temp_dir,
            config_path,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_schedule(&self, name: &str, json: &str) {
        fs::write(self.root().join("schedules").join(name), json)
            .expect("Failed to write schedule");
    }

    pub fn write_page(&self, name: &str, markdown: &str) {
        fs::write(self.root().join("notes").join("pages").join(name), markdown)
            .expect("Failed to write page");
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("seqcal").expect("Failed to find seqcal binary");
        cmd.arg("--config").arg(&self.config_path);
        cmd.env("SEQCAL_TIMEZONE", "UTC");
        cmd
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Stdout of a successful run
    pub fn stdout_of(&self, args: &[&str]) -> String {
        let output = self.run_success(args).get_output().stdout.clone();
        String::from_utf8(output).expect("stdout is not UTF-8")
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub fn work_schedule() -> &'static str {
        r#"[
            {"title": "Review %month", "pattern": "second-friday", "calendar": "work", "stacked": true},
            {"title": "Standup", "pattern": 12, "calendar": "work", "stacked": false,
             "start_time": "09:00", "end_time": "09:15", "location": "Room 1"},
            {"title": "Rent", "pattern": "first-of-month", "calendar": "home", "stacked": true}
        ]"#
    }

    pub fn acme_page() -> &'static str {
        concat!(
            "---\ntags: work\n---\n\n",
            "- TODO [#A] Meet: Anna\n",
            "  SCHEDULED: <2024-03-18 Mon>\n",
            "- TODO [#B] Follow up: invoices\n",
            "- LATER tidy the archive\n",
            "- TODO Track: weekly numbers\n",
            "  SCHEDULED: <2024-03-04 Mon ++1w>\n",
        )
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    pub fn is_calendar() -> impl Predicate<str> {
        predicate::str::contains("BEGIN:VCALENDAR").and(predicate::str::contains("END:VCALENDAR"))
    }

    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("Page")
            .and(predicate::str::contains("Task"))
            .and(predicate::str::contains("Scheduled"))
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error")
    }
}
