use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PaymentRequestDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub amount: i64,
    pub bank_name: String,
    pub branch_code: String,
    pub account_number: String,
}

pub struct SettleBatchDto {
    pub requests: Vec<PaymentRequestDto>,
}

pub struct SettlementReportDto {
    pub processed_count: usize,
}
