//! Deposit engine: authenticated upload, Atom parsing and statement polling.
mod atom;
mod client;
mod credentials;
mod deposit;
mod engine;
mod error;
mod poll;
mod progress;
mod types;
mod upload;

pub use atom::{parse_atom, parse_receipt, parse_statement, AtomParseError, DepositReceipt};
pub use client::{AuthenticatedClient, ClientSettings, X_AUTHORIZATION};
pub use credentials::{
    Credentials, FileTokenProvider, NoTokenProvider, StaticTokenProvider, TokenProvider,
    DEFAULT_TOKEN_FILE,
};
pub use deposit::{DepositSettings, Depositor, ZIP_CONTENT_TYPE};
pub use engine::BlockingDepositor;
pub use error::{DepositError, FailureKind};
pub use poll::{PollSettings, StatementSource, StatusPoller, TrackedStatement};
pub use progress::{ChannelProgressSink, NullProgressSink, ProgressSink};
pub use types::{DepositEvent, DepositOutcome, RawResponse, Stage};
pub use upload::{
    DigestingUploader, PackagedPayload, UploadResponse, UploadSettings, BAGIT_PACKAGING,
};
