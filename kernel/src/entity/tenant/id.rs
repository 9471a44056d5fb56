use uuid::Uuid;
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Default, Fromln, AsRefln)]
pub struct TenantId(Uuid);

impl TenantId {
    pub fn new(id: impl Into<Uuid>) -> Self {
        Self(id.into())
    }
}
