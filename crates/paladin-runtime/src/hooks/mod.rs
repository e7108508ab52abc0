pub mod dispatcher;
pub mod envelope;
pub mod events;

pub use dispatcher::VerdictDispatcher;
pub use envelope::{run_hook, FailOpenEnvelope};
pub use events::{HookEvent, HookResponse};
