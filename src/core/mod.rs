//! Core application primitives (gating, scheduling, the scan loop)

pub mod cooldown;
pub mod http;
pub mod scanner;
pub mod scheduler;

pub use cooldown::{CooldownTracker, NEVER_ALERTED};
pub use scanner::{ScanOrchestrator, ScanReport, SymbolOutcome};
pub use scheduler::CycleSchedule;
