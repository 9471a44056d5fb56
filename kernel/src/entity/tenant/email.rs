use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }
}
