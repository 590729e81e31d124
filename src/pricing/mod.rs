//! Checkout pricing rules: voucher evaluation and delivery fees.
//!
//! Everything in here is synchronous and free of I/O. Services load the
//! cart and vouchers, then hand plain values to these functions.

pub mod cart;
pub mod money;
pub mod shipping;
pub mod voucher;

pub use cart::{Cart, CartLine};
pub use money::round_money;
pub use shipping::{Coordinates, ShippingCalculator, ShippingQuote};
pub use voucher::{Applicability, Rejection, Voucher, VoucherType};
