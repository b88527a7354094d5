pub mod expiration;
pub mod fees;
pub mod orchestrator;

pub use crate::domain::model::{Card, Credentials, PaymentContext};
pub use crate::domain::ports::{CardSource, PaymentSession, Portal};
pub use crate::utils::error::Result;
