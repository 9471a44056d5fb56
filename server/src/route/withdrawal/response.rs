use serde::Serialize;

use application::transfer::WithdrawalReceiptDto;

use crate::controller::Exhaust;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResponse {
    success: bool,
    transaction_id: String,
}

pub struct WithdrawalPresenter;

impl Exhaust<WithdrawalReceiptDto> for WithdrawalPresenter {
    type To = WithdrawalResponse;
    fn emit(&self, input: WithdrawalReceiptDto) -> Self::To {
        WithdrawalResponse {
            success: true,
            transaction_id: input.transaction_id,
        }
    }
}
