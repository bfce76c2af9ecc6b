pub mod orchestrator;
pub mod splitting;

pub use orchestrator::{SplitOrchestrator, SplitOutput, SplitPlan, SplitReport, SplitTriple};
