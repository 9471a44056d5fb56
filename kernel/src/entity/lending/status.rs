#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LendingStatus {
    Active,
    Returned,
    Overdue,
}

impl LendingStatus {
    pub fn as_symbol(&self) -> &'static str {
        match self {
            LendingStatus::Active => "active",
            LendingStatus::Returned => "returned",
            LendingStatus::Overdue => "overdue",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "active" => Some(LendingStatus::Active),
            "returned" => Some(LendingStatus::Returned),
            "overdue" => Some(LendingStatus::Overdue),
            _ => None,
        }
    }
}
