use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartItemDto, CartList},
        orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        shipping::{ShippingQuoteRequest, ShippingResult},
        vouchers::{
            ApplicabilityKind, CreateVoucherRequest, UpdateVoucherStatusRequest,
            ValidateVoucherRequest, ValidateVoucherResult, VoucherList, VoucherUsageList,
        },
    },
    models::{CartItem, Order, OrderItem, Product, Voucher, VoucherUsage},
    pricing::VoucherType,
    response::{ApiResponse, Meta},
    routes::{cart, health, orders, params, products, shipping, vouchers},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        orders::list_order,
        orders::checkout,
        orders::get_order,
        vouchers::validate_voucher,
        vouchers::list_vouchers,
        vouchers::create_voucher,
        vouchers::get_voucher,
        vouchers::update_voucher_status,
        vouchers::list_voucher_usages,
        shipping::quote_shipping
    ),
    components(
        schemas(
            Product,
            CartItem,
            Order,
            OrderItem,
            Voucher,
            VoucherUsage,
            VoucherType,
            ApplicabilityKind,
            AddToCartRequest,
            CartItemDto,
            CartList,
            CheckoutRequest,
            CheckoutResponse,
            OrderList,
            OrderWithItems,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateVoucherRequest,
            UpdateVoucherStatusRequest,
            ValidateVoucherRequest,
            ValidateVoucherResult,
            VoucherList,
            VoucherUsageList,
            ShippingQuoteRequest,
            ShippingResult,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::VoucherListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartList>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<Voucher>,
            ApiResponse<VoucherList>,
            ApiResponse<ValidateVoucherResult>,
            ApiResponse<ShippingResult>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Farm produce catalogue"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Vouchers", description = "Discount vouchers"),
        (name = "Shipping", description = "Delivery fee quotes"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
