#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Bulk,
    Withdrawal,
}

impl IntentKind {
    pub fn as_symbol(&self) -> &'static str {
        match self {
            IntentKind::Bulk => "bulk",
            IntentKind::Withdrawal => "withdrawal",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "bulk" => Some(IntentKind::Bulk),
            "withdrawal" => Some(IntentKind::Withdrawal),
            _ => None,
        }
    }
}

/// `pending` intents are the reconciliation work list: the transfer may or
/// may not have reached the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentStatus {
    Pending,
    Completed,
    Failed,
}

impl IntentStatus {
    pub fn as_symbol(&self) -> &'static str {
        match self {
            IntentStatus::Pending => "pending",
            IntentStatus::Completed => "completed",
            IntentStatus::Failed => "failed",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "pending" => Some(IntentStatus::Pending),
            "completed" => Some(IntentStatus::Completed),
            "failed" => Some(IntentStatus::Failed),
            _ => None,
        }
    }
}
