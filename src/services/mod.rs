pub mod content_source;
pub mod diagnostics;
pub mod notifier;
pub mod usage_ledger;

pub use content_source::{pick_unused, ContentSource, FileContentSource};
pub use diagnostics::{DiagnosticsWriter, FailurePhase};
pub use notifier::{build_notifier, subjects, EmailNotifier, NoopNotifier, Notifier};
pub use usage_ledger::UsageLedger;
