//! Per-student check execution.

use super::operation::{Operation, ProblemReport};
use crate::report;
use crate::toolchain::Toolchain;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Conditions that abort one student's check without contributing to their
/// per-problem report. The batch proceeds to the next student.
#[derive(Debug, Error)]
pub enum StudentCheckError {
    #[error("no handin directory for {0}")]
    DirMissing(String),
    #[error("cannot enter handin directory for {id}: {source}")]
    DirUnreadable {
        id: String,
        #[source]
        source: io::Error,
    },
    #[error("check infrastructure failure for {id}: {source:#}")]
    Check {
        id: String,
        #[source]
        source: anyhow::Error,
    },
}

/// One student's aggregate result: the failing problems only, in
/// ascending problem-number order.
#[derive(Debug)]
pub struct StudentReport {
    pub id: String,
    pub problems: Vec<ProblemReport>,
}

impl StudentReport {
    pub fn has_errors(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Render the bordered error log for this student. Colors are left in
    /// for terminal display; strip before writing to disk.
    pub fn render(&self, course: &str, assignment: &str) -> String {
        let mut out = report::output_header(course, assignment, &self.id);
        for problem in &self.problems {
            out.push_str(&report::header_line(
                &format!("Problem {}", problem.number),
                true,
            ));
            out.push_str(&problem.error_text());
            out.push('\n');
        }
        out
    }
}

/// Executes the assignment's ordered operation list for single students.
pub struct CheckRunner<'a> {
    pub ops: &'a [Operation],
    pub toolchain: &'a dyn Toolchain,
    pub skip_compile: bool,
}

impl CheckRunner<'_> {
    /// Check the student whose submissions live at `handin_dir/<id>`.
    pub fn check_student(
        &self,
        handin_dir: &Path,
        id: &str,
    ) -> Result<StudentReport, StudentCheckError> {
        let student_dir = handin_dir.join(id);
        if !student_dir.is_dir() {
            return Err(StudentCheckError::DirMissing(id.to_string()));
        }
        // Canonical absolute path keeps compile file paths valid when the
        // toolchain runs from its scratch directory.
        let student_dir = student_dir
            .canonicalize()
            .map_err(|source| StudentCheckError::DirUnreadable {
                id: id.to_string(),
                source,
            })?;
        self.check_dir(&student_dir, id)
    }

    /// Check an already-resolved submission directory. Problems run in
    /// ascending number order and a failing problem never stops the ones
    /// after it, so one report covers the whole assignment.
    pub fn check_dir(&self, dir: &Path, id: &str) -> Result<StudentReport, StudentCheckError> {
        let mut problems = Vec::new();
        for op in self.ops {
            let problem = op
                .run(dir, self.toolchain, self.skip_compile)
                .map_err(|source| StudentCheckError::Check {
                    id: id.to_string(),
                    source,
                })?;
            if problem.has_errors() {
                problems.push(problem);
            }
        }
        Ok(StudentReport {
            id: id.to_string(),
            problems,
        })
    }
}
