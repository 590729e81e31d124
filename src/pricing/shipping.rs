use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{cart::Cart, money::round_money};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingQuote {
    pub shipping_fee: Decimal,
    pub distance_km: Decimal,
    pub is_free_shipping: bool,
}

/// Delivery fee rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingCalculator {
    pub base_fee: Decimal,
    pub free_radius_km: Decimal,
    pub fee_per_km: Decimal,
    pub free_items: i64,
    pub fee_per_extra_item: Decimal,
    pub free_shipping_threshold: Decimal,
    pub max_fee: Decimal,
    /// Charged when the destination could not be located.
    pub fallback_fee: Decimal,
}

impl Default for ShippingCalculator {
    fn default() -> Self {
        Self {
            base_fee: Decimal::from(50),
            free_radius_km: Decimal::from(10),
            fee_per_km: Decimal::from(2),
            free_items: 5,
            fee_per_extra_item: Decimal::from(5),
            free_shipping_threshold: Decimal::from(500),
            max_fee: Decimal::from(200),
            fallback_fee: Decimal::from(50),
        }
    }
}

impl ShippingCalculator {
    pub fn calculate_fee(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        cart: &Cart,
    ) -> ShippingQuote {
        let distance = haversine_km(origin, destination);
        let distance_km = Decimal::from_f64(distance).unwrap_or(Decimal::ZERO);
        self.fee_for_distance(distance_km, cart)
    }

    pub fn fee_for_distance(&self, distance_km: Decimal, cart: &Cart) -> ShippingQuote {
        let mut fee = self.base_fee;

        if distance_km > self.free_radius_km {
            fee += (distance_km - self.free_radius_km) * self.fee_per_km;
        }

        let total_items = cart.total_items();
        if total_items > self.free_items {
            fee += Decimal::from(total_items - self.free_items) * self.fee_per_extra_item;
        }

        // threshold wins over every surcharge
        let is_free_shipping = cart.total() >= self.free_shipping_threshold;
        if is_free_shipping {
            fee = Decimal::ZERO;
        }

        ShippingQuote {
            shipping_fee: round_money(fee.min(self.max_fee).max(Decimal::ZERO)),
            distance_km: round_money(distance_km),
            is_free_shipping,
        }
    }

    /// Flat fee for destinations without coordinates. The free-shipping
    /// threshold still applies.
    pub fn fallback_quote(&self, cart: &Cart) -> ShippingQuote {
        let is_free_shipping = cart.total() >= self.free_shipping_threshold;
        let fee = if is_free_shipping {
            Decimal::ZERO
        } else {
            self.fallback_fee
        };
        ShippingQuote {
            shipping_fee: round_money(fee),
            distance_km: Decimal::ZERO,
            is_free_shipping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::cart::CartLine;
    use uuid::Uuid;

    fn cart(quantity: i32, price: i64) -> Cart {
        Cart::new(vec![CartLine {
            product_id: Uuid::new_v4(),
            category: "produce".into(),
            quantity,
            price_per_unit: Decimal::from(price),
            unit: "kg".into(),
        }])
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_km(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn same_point_is_zero() {
        let p = Coordinates::new(-6.2, 106.8);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn within_free_radius_pays_base_fee() {
        let calc = ShippingCalculator::default();
        let quote = calc.fee_for_distance(Decimal::from(10), &cart(5, 10));
        assert_eq!(quote.shipping_fee, Decimal::from(50));
        assert!(!quote.is_free_shipping);
    }

    #[test]
    fn item_surcharge_beyond_five_units() {
        let calc = ShippingCalculator::default();
        let quote = calc.fee_for_distance(Decimal::ZERO, &cart(8, 10));
        assert_eq!(quote.shipping_fee, Decimal::from(65));
    }

    #[test]
    fn fee_is_capped() {
        let calc = ShippingCalculator::default();
        let quote = calc.fee_for_distance(Decimal::from(400), &cart(1, 10));
        assert_eq!(quote.shipping_fee, Decimal::from(200));
    }

    #[test]
    fn threshold_overrides_surcharges() {
        let calc = ShippingCalculator::default();
        let quote = calc.fee_for_distance(Decimal::from(400), &cart(50, 10));
        assert_eq!(quote.shipping_fee, Decimal::ZERO);
        assert!(quote.is_free_shipping);
    }

    #[test]
    fn fallback_charges_flat_fee_below_threshold() {
        let calc = ShippingCalculator::default();
        let quote = calc.fallback_quote(&cart(40, 10));
        assert_eq!(quote.shipping_fee, Decimal::from(50));
        assert!(!quote.is_free_shipping);
    }

    #[test]
    fn fallback_ships_free_at_threshold() {
        let calc = ShippingCalculator::default();
        let quote = calc.fallback_quote(&cart(60, 10));
        assert_eq!(quote.shipping_fee, Decimal::ZERO);
        assert!(quote.is_free_shipping);

        let quote = calc.fallback_quote(&cart(50, 10));
        assert_eq!(quote.shipping_fee, Decimal::ZERO);
    }

    #[test]
    fn coordinates_out_of_range_are_invalid() {
        assert!(Coordinates::new(-6.2, 106.8).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    }
}
