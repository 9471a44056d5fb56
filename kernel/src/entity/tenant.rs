mod bank_account;
mod email;
mod id;
mod name;

pub use self::{bank_account::*, email::*, id::*, name::*};
use destructure::Destructure;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Tenant {
    id: TenantId,
    name: TenantName,
    contact_email: ContactEmail,
    bank_account: BankAccount,
}

impl Tenant {
    pub fn new(
        id: TenantId,
        name: TenantName,
        contact_email: ContactEmail,
        bank_account: BankAccount,
    ) -> Self {
        Self {
            id,
            name,
            contact_email,
            bank_account,
        }
    }
}
