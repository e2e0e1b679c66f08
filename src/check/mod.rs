//! The verification engine: per-problem operations, the per-student
//! check runner, and the batch orchestrator.

pub mod batch;
pub mod operation;
pub mod runner;

pub use batch::{run_batch, BatchOutcome};
pub use operation::{Operation, ProblemReport};
pub use runner::{CheckRunner, StudentCheckError, StudentReport};
