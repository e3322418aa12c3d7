use patungan_domain::{IncompleteAllocation, LedgerError};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("only PDF receipts are accepted (got {})", describe_document(.filename, .content_type))]
    UnsupportedDocument {
        filename: Option<String>,
        content_type: Option<String>,
    },
    #[error("receipt data is malformed: {detail}")]
    Malformed { detail: String },
    #[error("receipt data is invalid: {source}")]
    InvalidReceipt { source: LedgerError },
    #[error("receipt parser failed: {source}")]
    Service { source: BoxError },
}

fn describe_document(filename: &Option<String>, content_type: &Option<String>) -> String {
    match (filename, content_type) {
        (Some(name), Some(kind)) => format!("{name} ({kind})"),
        (Some(name), None) => name.clone(),
        (None, Some(kind)) => kind.clone(),
        (None, None) => "an unnamed document".to_owned(),
    }
}

#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error("failed to rasterise the split summary")]
    Rasterise,
    #[error("summary renderer failed: {source}")]
    Service { source: BoxError },
}

/// Everything a wizard operation can refuse with. None of these change session state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Incomplete(#[from] IncompleteAllocation),
    #[error(transparent)]
    Render(#[from] RenderFailure),
    #[error("the receipt has no items")]
    NoItems,
    #[error("nobody has been added to the split")]
    NoPeople,
}
