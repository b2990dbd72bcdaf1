// * Batch orchestration and reporting

pub mod batch;
pub mod report;

pub use batch::{BatchError, BatchRunner, PairRequest};
pub use report::{BatchReport, PairReport, PairStatus, Verdict};
