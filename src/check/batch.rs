//! Batch orchestration across a student roster.

use super::operation::Operation;
use super::runner::{CheckRunner, StudentReport};
use crate::config::AssignmentConfig;
use crate::report;
use crate::settings::Settings;
use crate::toolchain::Toolchain;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use tracing::warn;

/// Result of checking one assignment across a roster.
pub struct BatchOutcome {
    /// Failing students, in roster order.
    pub failing: Vec<StudentReport>,
    /// Students skipped for infrastructure reasons (missing directory,
    /// toolchain fault), with the reason text.
    pub skipped: Vec<(String, String)>,
    /// Where the aggregate artifact was written, if any student failed.
    pub results_path: Option<PathBuf>,
}

/// Build the ordered operation list for an assignment. The config loader
/// already sorted problems by ascending number.
pub fn make_operations(config: &AssignmentConfig) -> Vec<Operation> {
    config.problems.iter().map(Operation::from_spec).collect()
}

/// Check every student in `ids`, in the order given.
///
/// Failing students get an `errors.log` written into their handin
/// directory (a stale log from an earlier run is removed when the student
/// now passes) and are folded into the aggregate results artifact, which
/// is only written when at least one student failed.
pub fn run_batch(
    settings: &Settings,
    config: &AssignmentConfig,
    ids: &[String],
    toolchain: &dyn Toolchain,
    skip_compile: bool,
) -> Result<BatchOutcome> {
    let ops = make_operations(config);
    let runner = CheckRunner {
        ops: &ops,
        toolchain,
        skip_compile,
    };

    let mut failing = Vec::new();
    let mut skipped = Vec::new();
    for id in ids {
        println!("\tchecking {id}");
        match runner.check_student(&settings.handin_dir, id) {
            Ok(student) if student.has_errors() => {
                let rendered = student.render(&settings.course, &config.id);
                if let Err(e) = report::write_error_log(&settings.handin_dir.join(id), &rendered) {
                    warn!("could not write error log for {id}: {e:#}");
                    eprintln!("{} could not write error log for {id}: {e:#}", "warning:".yellow());
                }
                failing.push(student);
            }
            Ok(_) => {
                // A clean run invalidates any log left from an earlier one.
                if let Err(e) = report::remove_stale_log(&settings.handin_dir.join(id)) {
                    warn!("could not remove stale log for {id}: {e:#}");
                }
            }
            Err(e) => {
                warn!("skipping {id}: {e}");
                eprintln!("{} {e}", "warning:".yellow());
                skipped.push((id.clone(), e.to_string()));
            }
        }
    }

    let rendered: Vec<String> = failing
        .iter()
        .map(|s| s.render(&settings.course, &config.id))
        .collect();
    let results_path = report::write_batch_results(&settings.results_dir, &config.id, &rendered)?;

    Ok(BatchOutcome {
        failing,
        skipped,
        results_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::report::ERROR_LOG;
    use crate::toolchain::ToolOutcome;
    use anyhow::Result;
    use serial_test::serial;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    struct NoopToolchain;

    impl Toolchain for NoopToolchain {
        fn analyze(&self, _files: &[PathBuf], _work_dir: &Path) -> Result<ToolOutcome> {
            Ok(ToolOutcome {
                success: true,
                output: String::new(),
            })
        }

        fn compile(
            &self,
            _files: &[PathBuf],
            _module: Option<&str>,
            _work_dir: &Path,
        ) -> Result<ToolOutcome> {
            Ok(ToolOutcome {
                success: true,
                output: String::new(),
            })
        }
    }

    struct Course {
        _root: TempDir,
        settings: Settings,
    }

    fn course(cfg_json: &str) -> Course {
        let root = TempDir::new().unwrap();
        let handin = root.path().join("handin");
        let cfgs = root.path().join("hw_configs");
        let results = root.path().join("results");
        fs::create_dir_all(&handin).unwrap();
        fs::create_dir_all(&cfgs).unwrap();
        fs::write(cfgs.join("Hw8_cfg.json"), cfg_json).unwrap();
        let settings = Settings {
            course: "18240".to_string(),
            group: "ee240".to_string(),
            handin_dir: handin,
            cfg_dir: cfgs,
            results_dir: results,
            roster: root.path().join("roster.txt"),
            compile_timeout: Duration::from_secs(5),
        };
        Course {
            _root: root,
            settings,
        }
    }

    fn add_student(settings: &Settings, id: &str, files: &[&str]) {
        let dir = settings.handin_dir.join(id);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), "module m; endmodule\n").unwrap();
        }
    }

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    #[serial(scratch)]
    fn test_spec_scenario_missing_compile_files() {
        // Problem 1 wants a.v to exist; problem 2 wants b.v and c.v compiled.
        // The student has only a.v.
        let course = course(
            r#"[{"number": 1, "files": ["a.v"]},
                {"number": 2, "compileFiles": ["b.v", "c.v"]}]"#,
        );
        add_student(&course.settings, "mbrewer", &["a.v"]);

        let cfg = config::load(&course.settings.cfg_dir, "hw8").unwrap();
        let outcome = run_batch(
            &course.settings,
            &cfg,
            &ids(&["mbrewer"]),
            &NoopToolchain,
            false,
        )
        .unwrap();

        assert_eq!(outcome.failing.len(), 1);
        let student = &outcome.failing[0];
        // Problem 1 passed; problem 2 failed with two missing files
        assert_eq!(student.problems.len(), 1);
        assert_eq!(student.problems[0].number, 2);
        assert_eq!(student.problems[0].errors.len(), 2);

        let log = fs::read_to_string(course.settings.handin_dir.join("mbrewer").join(ERROR_LOG))
            .unwrap();
        assert!(log.contains("Problem 2"));
        assert!(log.contains("b.v: file does not exist"));
        assert!(log.contains("c.v: file does not exist"));
        assert!(!log.contains("Problem 1"));
    }

    #[test]
    #[serial(scratch)]
    fn test_passing_students_leave_no_artifacts() {
        let course = course(r#"[{"number": 1, "files": ["a.v"]}]"#);
        add_student(&course.settings, "abc", &["a.v"]);
        // Stale log from a previous failing run
        let stale = course.settings.handin_dir.join("abc").join(ERROR_LOG);
        fs::write(&stale, "old failure").unwrap();

        let cfg = config::load(&course.settings.cfg_dir, "hw8").unwrap();
        let outcome =
            run_batch(&course.settings, &cfg, &ids(&["abc"]), &NoopToolchain, false).unwrap();

        assert!(outcome.failing.is_empty());
        assert!(outcome.results_path.is_none());
        assert!(!stale.exists());
        assert!(!course.settings.results_dir.join("Hw8_results.txt").exists());
    }

    #[test]
    #[serial(scratch)]
    fn test_missing_student_dir_skipped_batch_continues() {
        let course = course(r#"[{"number": 1, "files": ["a.v"]}]"#);
        add_student(&course.settings, "abc", &[]);

        let cfg = config::load(&course.settings.cfg_dir, "hw8").unwrap();
        let outcome = run_batch(
            &course.settings,
            &cfg,
            &ids(&["ghost", "abc"]),
            &NoopToolchain,
            false,
        )
        .unwrap();

        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].0, "ghost");
        // abc was still checked and failed the existence check
        assert_eq!(outcome.failing.len(), 1);
        assert_eq!(outcome.failing[0].id, "abc");
    }

    #[test]
    #[serial(scratch)]
    fn test_results_artifact_preserves_roster_order() {
        let course = course(r#"[{"number": 1, "files": ["a.v"]}]"#);
        add_student(&course.settings, "zeta", &[]);
        add_student(&course.settings, "alpha", &[]);

        let cfg = config::load(&course.settings.cfg_dir, "hw8").unwrap();
        let outcome = run_batch(
            &course.settings,
            &cfg,
            &ids(&["zeta", "alpha"]),
            &NoopToolchain,
            false,
        )
        .unwrap();

        let failing: Vec<&str> = outcome.failing.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(failing, vec!["zeta", "alpha"]);

        let path = outcome.results_path.unwrap();
        assert!(path.ends_with("Hw8_results.txt"));
        let contents = fs::read_to_string(path).unwrap();
        let zeta = contents.find("Error log for: zeta").unwrap();
        let alpha = contents.find("Error log for: alpha").unwrap();
        assert!(zeta < alpha);
        assert!(!contents.contains('\x1b'));
    }

    #[test]
    #[serial(scratch)]
    fn test_working_directory_invariant_across_batch() {
        let course = course(r#"[{"number": 1, "files": ["a.v"]}]"#);
        add_student(&course.settings, "abc", &[]);

        let before = std::env::current_dir().unwrap();
        let cfg = config::load(&course.settings.cfg_dir, "hw8").unwrap();
        let _ = run_batch(
            &course.settings,
            &cfg,
            &ids(&["abc", "ghost"]),
            &NoopToolchain,
            false,
        )
        .unwrap();
        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
