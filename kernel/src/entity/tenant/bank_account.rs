use destructure::Destructure;
use vodca::{AsRefln, Fromln, References};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct BankName(String);

impl BankName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct BranchCode(String);

impl BranchCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct AccountType(String);

impl AccountType {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }
}

/// Bank account registered by a tenant for automatic withdrawal.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct BankAccount {
    bank_name: BankName,
    branch_code: BranchCode,
    account_type: AccountType,
    account_number: AccountNumber,
}

impl BankAccount {
    pub fn new(
        bank_name: BankName,
        branch_code: BranchCode,
        account_type: AccountType,
        account_number: AccountNumber,
    ) -> Self {
        Self {
            bank_name,
            branch_code,
            account_type,
            account_number,
        }
    }
}
