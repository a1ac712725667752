//! Live monitoring: the periodic re-evaluation loop and its scheduler

pub mod risk_monitor;
pub mod scheduler;

pub use risk_monitor::{RiskMonitor, Subscription};
pub use scheduler::ScheduledTask;
