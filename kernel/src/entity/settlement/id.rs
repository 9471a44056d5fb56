use uuid::Uuid;
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Hash, Eq, PartialEq, Default, Fromln, AsRefln)]
pub struct IntentId(Uuid);

impl IntentId {
    pub fn new(id: impl Into<Uuid>) -> Self {
        Self(id.into())
    }
}
