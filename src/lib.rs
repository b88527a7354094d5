pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::csv_cards::{resolve_cards_path, CsvCardSource};
pub use adapters::prompt_cards::PromptCardSource;
pub use adapters::sandbox::{SandboxPortal, SandboxSession};
pub use config::{cli::Cli, AppConfig};
pub use core::orchestrator::{PaymentOrchestrator, RunReport, StopReason};
pub use domain::model::{Card, Credentials, PaymentContext};
pub use domain::ports::{CardSource, PaymentSession, Portal};
pub use utils::error::{ErrorCategory, PayError, Result};
