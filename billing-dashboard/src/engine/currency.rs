use crate::models::coerce::parse_float_lenient;
use rust_decimal::{Decimal, RoundingStrategy};

/// Dollars with exactly two decimals and no thousands separators.
/// A missing amount formats as `0.00`.
pub fn format_currency(amount: Option<Decimal>) -> String {
    let amount = amount
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", amount)
}

/// [`format_currency`] for loosely typed input; unparseable text is zero.
pub fn format_currency_str(amount: &str) -> String {
    format_currency(parse_float_lenient(amount))
}
