use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::model::{Card, Credentials};
use crate::utils::error::Result;

/// An authenticated handle onto the payment portal. Implementations wrap
/// whatever actually drives the portal (a browser session, or the sandbox
/// simulator); the orchestrator only ever talks to this trait, strictly one
/// call at a time.
#[async_trait]
pub trait PaymentSession: Send {
    /// Current outstanding balance on the account.
    async fn remaining_balance(&mut self) -> Result<Decimal>;

    /// Submit one card payment for `amount` and return the new balance.
    ///
    /// Implementations must verify the fee and total the portal displays
    /// against the submitted amount before confirming, and fail with
    /// `FeeMismatch`/`TotalMismatch` instead of completing a charge that
    /// differs from what was requested. A refused payment is
    /// `SubmissionRejected`. All three are fatal to the run; the caller
    /// never retries a financial action.
    async fn submit_payment(&mut self, card: &Card, amount: Decimal) -> Result<Decimal>;

    /// Probe the portal for the live transaction-fee percentage.
    async fn discover_fee_percent(&mut self) -> Result<Decimal>;

    async fn close(&mut self) -> Result<()>;
}

/// The authentication step: exchanges credentials for a live session.
#[async_trait]
pub trait Portal: Send + Sync {
    type Session: PaymentSession;

    async fn authenticate(&self, credentials: &Credentials) -> Result<Self::Session>;
}

/// Produces zero or more cards, one per call. CSV batches and interactive
/// prompting both sit behind this; `None` means the input is exhausted
/// (end of batch, or the "done" sentinel) and is normal termination.
#[async_trait]
pub trait CardSource: Send {
    async fn next_card(&mut self) -> Result<Option<Card>>;
}
