#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod ports;
pub mod receipt;
pub mod session;

pub use error::{BoxError, ParseFailure, RenderFailure, SessionError};
pub use ports::{ReceiptParser, RenderRequest, SummaryRenderer};
pub use receipt::{ParsedData, ReceiptDocument};
pub use session::{SessionId, SplitOutcome, SplitSession, WizardStep};
