use rust_decimal::Decimal;

/// One payment instrument. Field values are kept exactly as they were
/// entered; zero-padding of the month happens at submission time via
/// [`Card::exp_month_padded`], never at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvv: String,
    pub zip: String,
}

impl Card {
    pub fn exp_month_padded(&self) -> String {
        format!("{:0>2}", self.exp_month)
    }

    /// Log-safe display form; full card numbers never reach the logs.
    pub fn last4(&self) -> &str {
        let n = self.number.len();
        &self.number[n.saturating_sub(4)..]
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Run-scoped state captured once after authentication and fee discovery.
/// `initial_balance` never changes after capture; `pay_per_card` is constant
/// for the run. Target progress is derived from these on every balance
/// observation, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentContext {
    pub initial_balance: Decimal,
    pub pay_per_card: Decimal,
}

impl PaymentContext {
    pub fn paid_so_far(&self, balance: Decimal) -> Decimal {
        self.initial_balance - balance
    }

    pub fn remaining_to_target(&self, target: Decimal, balance: Decimal) -> Decimal {
        target - self.paid_so_far(balance)
    }
}
