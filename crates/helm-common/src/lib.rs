pub mod platform;
pub mod protocol;

pub use platform::Platform;
pub use protocol::{ActionKind, ActionStatus, BrowserAction, CommandOutcome, DataKind, ExtractedData};
