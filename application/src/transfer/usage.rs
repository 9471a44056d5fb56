use uuid::Uuid;

pub struct AggregateUsageDto {
    pub billing_month: String,
}

/// Monthly totals for one tenant. `usage_fee` sums the daily fee of every
/// activity in the period, `shipping_fee` is the flat rate times the item
/// count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantUsageDto {
    pub tenant_id: Uuid,
    pub usage_fee: i64,
    pub shipping_fee: i64,
    pub item_count: i64,
}
