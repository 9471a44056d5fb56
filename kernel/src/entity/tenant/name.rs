use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Fromln, AsRefln)]
pub struct TenantName(String);

impl TenantName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}
