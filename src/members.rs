//! Members

use crate::uuids::TypedUuid;

/// Member UUID
pub type MemberUuid = TypedUuid<Member>;

/// A participant in a shared cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    uuid: MemberUuid,
    name: String,
    email: String,
    avatar: String,
}

impl Member {
    /// Create a member with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Self {
        Self::with_uuid(MemberUuid::new(), name, email, avatar)
    }

    /// Create a member with a known id.
    pub fn with_uuid(
        uuid: MemberUuid,
        name: impl Into<String>,
        email: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Self {
        Self {
            uuid,
            name: name.into(),
            email: email.into(),
            avatar: avatar.into(),
        }
    }

    /// Member id
    pub fn uuid(&self) -> MemberUuid {
        self.uuid
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contact email
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Avatar reference
    pub fn avatar(&self) -> &str {
        &self.avatar
    }
}
