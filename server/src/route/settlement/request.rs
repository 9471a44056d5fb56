use serde::Deserialize;
use uuid::Uuid;

use application::transfer::{PaymentRequestDto, SettleBatchDto};

use crate::controller::Intake;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRequest {
    payment_requests: Option<Vec<PaymentRequestBody>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestBody {
    id: Uuid,
    company_id: Uuid,
    amount: i64,
    bank_info: BankInfoBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankInfoBody {
    bank_name: String,
    branch_code: String,
    account_number: String,
}

pub struct SettlementTransformer;

impl Intake<SettlementRequest> for SettlementTransformer {
    type To = SettleBatchDto;
    fn emit(&self, SettlementRequest { payment_requests }: SettlementRequest) -> Self::To {
        SettleBatchDto {
            requests: payment_requests
                .unwrap_or_default()
                .into_iter()
                .map(|request| PaymentRequestDto {
                    id: request.id,
                    company_id: request.company_id,
                    amount: request.amount,
                    bank_name: request.bank_info.bank_name,
                    branch_code: request.bank_info.branch_code,
                    account_number: request.bank_info.account_number,
                })
                .collect(),
        }
    }
}
