use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::core::fees;
use crate::core::{CardSource, PaymentContext, PaymentSession};
use crate::utils::error::Result;

/// Why a run ended. None of these are errors; session failures propagate
/// as `Err` instead and abort the run without a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cumulative target payment has been reached.
    TargetReached,
    /// Another payment of `pay_per_card` would overshoot the target.
    TargetWouldBeExceeded,
    /// The account balance dropped to zero or below.
    PaidInFull,
    /// The card batch ran out, or manual entry saw the "done" sentinel.
    OutOfCards,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub payments_made: u32,
    pub amount_paid: Decimal,
    pub final_balance: Decimal,
    pub stop: StopReason,
}

/// Drives the whole payment sequence against one session: discover the fee,
/// capture the starting balance, then submit card after card until a stop
/// condition fires. Owns the session exclusively for the run; every await is
/// strictly sequential, so there is never more than one submission in flight.
pub struct PaymentOrchestrator<S: PaymentSession> {
    session: S,
    amount_per_card: Decimal,
    target_payment: Option<Decimal>,
    keep_open: bool,
}

impl<S: PaymentSession> PaymentOrchestrator<S> {
    pub fn new(session: S, config: &AppConfig) -> Self {
        Self {
            session,
            amount_per_card: config.amount_per_card,
            target_payment: config.target_payment,
            keep_open: !config.headless,
        }
    }

    pub async fn run(&mut self, cards: &mut dyn CardSource) -> Result<RunReport> {
        let fee_percent = self.session.discover_fee_percent().await?;
        let pay_per_card = fees::amount_to_pay_per_card(self.amount_per_card, fee_percent);
        info!("transaction fee is {fee_percent}%; amount to pay per card: {pay_per_card}");

        let initial_balance = self.session.remaining_balance().await?;
        info!("outstanding balance: {initial_balance}");
        let ctx = PaymentContext {
            initial_balance,
            pay_per_card,
        };

        let mut balance = initial_balance;
        let mut payments_made = 0u32;
        let stop = loop {
            if let Some(reason) = self.target_stop(&ctx).await? {
                break reason;
            }
            let Some(card) = cards.next_card().await? else {
                break StopReason::OutOfCards;
            };
            debug!("submitting {} with card ending {}", ctx.pay_per_card, card.last4());
            balance = self.session.submit_payment(&card, ctx.pay_per_card).await?;
            payments_made += 1;
            self.log_progress(&ctx, balance);
            if balance <= Decimal::ZERO {
                break StopReason::PaidInFull;
            }
        };

        match stop {
            StopReason::TargetReached => info!("target payment reached; stopping"),
            StopReason::TargetWouldBeExceeded => {
                info!("next payment would exceed the target; stopping")
            }
            StopReason::PaidInFull => info!("balance paid in full"),
            StopReason::OutOfCards => info!("no more cards; stopping"),
        }

        if self.keep_open {
            info!("non-headless run; keeping the portal session open for inspection");
        } else {
            info!("closing portal session");
            self.session.close().await?;
        }

        Ok(RunReport {
            payments_made,
            amount_paid: ctx.paid_so_far(balance),
            final_balance: balance,
            stop,
        })
    }

    /// Give the session back after a run, e.g. to inspect a kept-open one.
    pub fn into_session(self) -> S {
        self.session
    }

    /// Pre-payment stop check. Only active when a target is configured, and
    /// always works from a fresh balance read so the derivation never uses a
    /// cached value.
    async fn target_stop(&mut self, ctx: &PaymentContext) -> Result<Option<StopReason>> {
        let Some(target) = self.target_payment else {
            return Ok(None);
        };
        let balance = self.session.remaining_balance().await?;
        Ok(evaluate_stop_rule(target, ctx, balance))
    }

    fn log_progress(&self, ctx: &PaymentContext, balance: Decimal) {
        let paid = ctx.paid_so_far(balance);
        info!("paid {paid} so far; {balance} remaining on the account");
        if let Some(target) = self.target_payment {
            let remaining = ctx.remaining_to_target(target, balance);
            let estimate = estimated_payments_remaining(remaining, ctx.pay_per_card);
            info!("{remaining} left toward the {target} target (about {estimate} more payments)");
        }
    }
}

pub fn evaluate_stop_rule(
    target: Decimal,
    ctx: &PaymentContext,
    balance: Decimal,
) -> Option<StopReason> {
    let remaining = ctx.remaining_to_target(target, balance);
    if remaining <= Decimal::ZERO {
        Some(StopReason::TargetReached)
    } else if remaining < ctx.pay_per_card {
        Some(StopReason::TargetWouldBeExceeded)
    } else {
        None
    }
}

fn estimated_payments_remaining(remaining: Decimal, pay_per_card: Decimal) -> u32 {
    if remaining <= Decimal::ZERO {
        return 0;
    }
    (remaining / pay_per_card).ceil().to_u32().unwrap_or(0)
}
