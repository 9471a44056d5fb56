use serde::Deserialize;
use uuid::Uuid;

use application::transfer::WithdrawalDto;

use crate::controller::Intake;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    company_id: Uuid,
    amount: i64,
    withdrawal_date: String,
}

pub struct WithdrawalTransformer;

impl Intake<WithdrawalRequest> for WithdrawalTransformer {
    type To = WithdrawalDto;
    fn emit(
        &self,
        WithdrawalRequest {
            company_id,
            amount,
            withdrawal_date,
        }: WithdrawalRequest,
    ) -> Self::To {
        WithdrawalDto {
            company_id,
            amount,
            withdrawal_date,
        }
    }
}
