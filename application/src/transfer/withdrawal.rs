use uuid::Uuid;

pub struct WithdrawalDto {
    pub company_id: Uuid,
    pub amount: i64,
    pub withdrawal_date: String,
}

pub struct WithdrawalReceiptDto {
    pub transaction_id: String,
}
