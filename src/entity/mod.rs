pub mod cart_items;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod voucher_usages;
pub mod vouchers;

pub use cart_items::Entity as CartItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use voucher_usages::Entity as VoucherUsages;
pub use vouchers::Entity as Vouchers;
