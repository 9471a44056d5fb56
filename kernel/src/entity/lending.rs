mod date;
mod id;
mod status;

pub use self::{date::*, id::*, status::*};
use destructure::Destructure;
use vodca::References;

use crate::entity::{DailyFee, TenantId};

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct LendingActivity {
    id: LendingId,
    book_id: BookId,
    tenant_id: TenantId,
    lending_date: LendingDate,
    return_due_date: ReturnDueDate,
    returned_at: Option<ReturnedAt>,
    status: LendingStatus,
}

impl LendingActivity {
    pub fn new(
        id: LendingId,
        book_id: BookId,
        tenant_id: TenantId,
        lending_date: LendingDate,
        return_due_date: ReturnDueDate,
        returned_at: Option<ReturnedAt>,
        status: LendingStatus,
    ) -> Self {
        Self {
            id,
            book_id,
            tenant_id,
            lending_date,
            return_due_date,
            returned_at,
            status,
        }
    }
}

/// One billable lending activity joined with the daily fee of its book
/// contract. Read model consumed by usage aggregation.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct LendingCharge {
    activity: LendingActivity,
    daily_fee: DailyFee,
}

impl LendingCharge {
    pub fn new(activity: LendingActivity, daily_fee: DailyFee) -> Self {
        Self {
            activity,
            daily_fee,
        }
    }
}
