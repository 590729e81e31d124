use rust_decimal::{Decimal, RoundingStrategy};

/// Currency amounts carry two decimal places.
pub const MONEY_DP: u32 = 2;

/// Rounds a currency amount to two places, midpoint away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_rounds_away_from_zero() {
        assert_eq!(round_money(Decimal::new(10005, 3)), Decimal::new(1001, 2));
        assert_eq!(round_money(Decimal::new(10025, 3)), Decimal::new(1003, 2));
        assert_eq!(round_money(Decimal::new(-10005, 3)), Decimal::new(-1001, 2));
    }

    #[test]
    fn keeps_two_places() {
        let rounded = round_money(Decimal::new(123456, 4));
        assert_eq!(rounded, Decimal::new(1235, 2));
        assert_eq!(rounded.scale(), 2);
    }
}
