pub mod config;
pub mod date_range;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod partition;
pub mod progress;
pub mod provider;
pub mod reconcile;
pub mod timestamp;

pub use config::AppConfig;
pub use engine::{AuditEngine, AuditOptions, AuditReport};
pub use error::Error;
pub use matrix::{CountGrid, CountMatrix};
pub use progress::{ProgressReporter, SilentReporter};
pub use provider::{FileListingProvider, LocalFilesystem, RemoteBlobStore};
pub use reconcile::{Diagnostic, DiagnosticKind, ZeroByteFile};
