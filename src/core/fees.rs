use rust_decimal::{Decimal, RoundingStrategy};

/// How much to submit per card so that the card's face value is consumed
/// exactly once the portal adds its fee: solves
/// `amount * (1 + fee/100) = total` for `amount`, to the cent.
pub fn amount_to_pay_per_card(total_amount: Decimal, fee_percent: Decimal) -> Decimal {
    let gross_multiplier = Decimal::ONE + fee_percent / Decimal::ONE_HUNDRED;
    (total_amount / gross_multiplier).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The fee the portal adds on top of a payment of `amount`.
pub fn fee_for(amount: Decimal, fee_percent: Decimal) -> Decimal {
    (amount * fee_percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Total the card gets charged for a payment of `amount`.
pub fn total_with_fee(amount: Decimal, fee_percent: Decimal) -> Decimal {
    amount + fee_for(amount, fee_percent)
}
