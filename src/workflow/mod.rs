pub mod outcome;
pub mod publisher;
pub mod session;

pub use outcome::{PublishOutcome, SessionOutcome};
pub use publisher::PostPublisher;
pub use session::SessionEstablisher;
