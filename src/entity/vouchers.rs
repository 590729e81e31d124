use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    /// Stored upper-case.
    #[sea_orm(unique)]
    pub code: String,
    pub description: String,
    pub voucher_type: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub minimum_order_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub maximum_discount: Option<Decimal>,
    pub valid_from: DateTimeWithTimeZone,
    pub valid_to: DateTimeWithTimeZone,
    pub usage_limit: i32,
    pub used_count: i32,
    pub is_active: bool,
    pub applicability: String,
    pub applicable_category: Option<String>,
    pub applicable_product_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::voucher_usages::Entity")]
    VoucherUsages,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::voucher_usages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherUsages.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
