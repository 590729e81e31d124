use rust_decimal::Decimal;
use uuid::Uuid;

use super::money::round_money;

/// One product line in a shopper's cart, priced at the current unit price.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub category: String,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub unit: String,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.price_per_unit * Decimal::from(self.quantity)
    }
}

/// The cart a checkout or preview is priced against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Monetary total of all lines.
    pub fn total(&self) -> Decimal {
        round_money(self.lines.iter().map(CartLine::line_total).sum())
    }

    /// Number of units across all lines.
    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.lines.iter().any(|line| line.category == category)
    }

    pub fn has_product(&self, product_id: Uuid) -> bool {
        self.lines.iter().any(|line| line.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(category: &str, quantity: i32, price: Decimal) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            category: category.to_string(),
            quantity,
            price_per_unit: price,
            unit: "kg".to_string(),
        }
    }

    #[test]
    fn totals_sum_over_lines() {
        let cart = Cart::new(vec![
            line("dairy", 2, Decimal::new(1250, 2)),
            line("produce", 3, Decimal::new(399, 2)),
        ]);
        assert_eq!(cart.total(), Decimal::new(3697, 2));
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn category_match_is_case_sensitive() {
        let cart = Cart::new(vec![line("Dairy", 1, Decimal::ONE)]);
        assert!(cart.has_category("Dairy"));
        assert!(!cart.has_category("dairy"));
    }

    #[test]
    fn empty_cart_totals_zero() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.total_items(), 0);
    }
}
