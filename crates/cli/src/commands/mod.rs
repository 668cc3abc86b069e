pub mod incidents;
pub mod logs;
pub mod metrics;
pub mod system;
