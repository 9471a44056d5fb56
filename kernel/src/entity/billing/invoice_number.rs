use vodca::{AsRefln, Fromln};

use crate::entity::BillingPeriod;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct InvoiceSequence(i32);

impl InvoiceSequence {
    pub fn new(value: impl Into<i32>) -> Self {
        Self(value.into())
    }
}

/// Unique invoice identifier, `INV-{YYYYMM}-{seq:04}`. Sequences start at 1
/// per billing period and are allocated from an atomic per-period counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    pub fn compose(period: &BillingPeriod, sequence: &InvoiceSequence) -> Self {
        Self(format!("INV-{}-{:04}", period.compact(), sequence.as_ref()))
    }
}

#[cfg(test)]
mod test {
    use super::{InvoiceNumber, InvoiceSequence};
    use crate::entity::BillingPeriod;

    #[test]
    fn composes_zero_padded_number() {
        let period = BillingPeriod::parse("2024-01").unwrap();
        let number = InvoiceNumber::compose(&period, &InvoiceSequence::new(1));
        assert_eq!(number.as_ref(), "INV-202401-0001");

        let number = InvoiceNumber::compose(&period, &InvoiceSequence::new(1234));
        assert_eq!(number.as_ref(), "INV-202401-1234");
    }
}
