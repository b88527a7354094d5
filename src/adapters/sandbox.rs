use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::core::fees;
use crate::domain::model::{Card, Credentials};
use crate::domain::ports::{PaymentSession, Portal};
use crate::utils::error::{PayError, Result};

/// In-process stand-in for the real payment portal, modeling an account
/// balance and the portal's fee arithmetic. A full run can be rehearsed
/// against it end-to-end before any browser automation gets pointed at a
/// live account, and it doubles as the test double for the orchestrator.
#[derive(Debug, Clone)]
pub struct SandboxPortal {
    opening_balance: Decimal,
    fee_percent: Decimal,
    applied_fee_percent: Decimal,
    total_surcharge: Decimal,
}

impl SandboxPortal {
    pub fn new(opening_balance: Decimal, fee_percent: Decimal) -> Self {
        Self {
            opening_balance,
            fee_percent,
            applied_fee_percent: fee_percent,
            total_surcharge: Decimal::ZERO,
        }
    }

    /// Make the portal apply a different fee than it quotes, to rehearse the
    /// fee-mismatch failure path.
    pub fn with_applied_fee_percent(mut self, applied: Decimal) -> Self {
        self.applied_fee_percent = applied;
        self
    }

    /// Pad the displayed total beyond amount + fee, to rehearse the
    /// total-mismatch failure path.
    pub fn with_total_surcharge(mut self, surcharge: Decimal) -> Self {
        self.total_surcharge = surcharge;
        self
    }
}

#[async_trait]
impl Portal for SandboxPortal {
    type Session = SandboxSession;

    async fn authenticate(&self, credentials: &Credentials) -> Result<Self::Session> {
        info!("sandbox portal: authenticated as {}", credentials.username);
        Ok(SandboxSession {
            balance: self.opening_balance,
            fee_percent: self.fee_percent,
            applied_fee_percent: self.applied_fee_percent,
            total_surcharge: self.total_surcharge,
            payments: Vec::new(),
            closed: false,
        })
    }
}

#[derive(Debug)]
pub struct SandboxSession {
    balance: Decimal,
    fee_percent: Decimal,
    applied_fee_percent: Decimal,
    total_surcharge: Decimal,
    payments: Vec<Decimal>,
    closed: bool,
}

impl SandboxSession {
    pub fn payments(&self) -> &[Decimal] {
        &self.payments
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl PaymentSession for SandboxSession {
    async fn remaining_balance(&mut self) -> Result<Decimal> {
        Ok(self.balance)
    }

    async fn submit_payment(&mut self, card: &Card, amount: Decimal) -> Result<Decimal> {
        if card.number.is_empty() || card.cvv.is_empty() {
            return Err(PayError::SubmissionRejected {
                reason: "card number and CVV are required".to_string(),
            });
        }
        if amount <= Decimal::ZERO {
            return Err(PayError::SubmissionRejected {
                reason: format!("payment amount must be positive, got {amount}"),
            });
        }

        // What the review page would show, checked against what was asked
        // for. Anything off is fatal before the charge is confirmed.
        let displayed_fee = fees::fee_for(amount, self.applied_fee_percent);
        let expected_fee = fees::fee_for(amount, self.fee_percent);
        if displayed_fee != expected_fee {
            return Err(PayError::FeeMismatch {
                quoted: self.fee_percent,
                applied: self.applied_fee_percent,
            });
        }

        let displayed_total = amount + displayed_fee + self.total_surcharge;
        let expected_total = fees::total_with_fee(amount, self.fee_percent);
        if displayed_total != expected_total {
            return Err(PayError::TotalMismatch {
                expected: expected_total,
                actual: displayed_total,
            });
        }

        self.balance -= amount;
        self.payments.push(amount);
        debug!(
            "sandbox portal: charged {displayed_total} to card ending {}; new balance {}",
            card.last4(),
            self.balance
        );
        Ok(self.balance)
    }

    async fn discover_fee_percent(&mut self) -> Result<Decimal> {
        debug!("sandbox portal: quoting a {}% transaction fee", self.fee_percent);
        Ok(self.fee_percent)
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
