// kvmd Infrastructure - System Adapters
// Implements: LivenessProbe, ProcessLauncher

pub mod process_table_probe;
pub mod service_launcher;

pub use process_table_probe::ProcessTableProbe;
pub use service_launcher::ServiceLauncher;
