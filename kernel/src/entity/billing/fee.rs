use destructure::Destructure;
use vodca::{AsRefln, Fromln, References};

/// Flat shipping rate charged once per lending activity.
pub const SHIPPING_FEE_PER_ITEM: i64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct DailyFee(i64);

impl DailyFee {
    pub fn new(amount: impl Into<i64>) -> Self {
        Self(amount.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct UsageFee(i64);

impl UsageFee {
    pub fn new(amount: impl Into<i64>) -> Self {
        Self(amount.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct ShippingFee(i64);

impl ShippingFee {
    pub fn new(amount: impl Into<i64>) -> Self {
        Self(amount.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct PaymentAmount(i64);

impl PaymentAmount {
    pub fn new(amount: impl Into<i64>) -> Self {
        Self(amount.into())
    }
}

/// Invoice line items. The invoice total is always derived from these two
/// fees, so the `total = usage + shipping` invariant holds by construction.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct FeeBreakdown {
    usage_fee: UsageFee,
    shipping_fee: ShippingFee,
}

impl FeeBreakdown {
    pub fn new(usage_fee: UsageFee, shipping_fee: ShippingFee) -> Self {
        Self {
            usage_fee,
            shipping_fee,
        }
    }

    pub fn total(&self) -> PaymentAmount {
        PaymentAmount::new(self.usage_fee.as_ref() + self.shipping_fee.as_ref())
    }
}

#[cfg(test)]
mod test {
    use super::{FeeBreakdown, ShippingFee, UsageFee};

    #[test]
    fn total_is_sum_of_line_items() {
        let breakdown = FeeBreakdown::new(UsageFee::new(45000), ShippingFee::new(5000));
        assert_eq!(*breakdown.total().as_ref(), 50000);
    }
}
