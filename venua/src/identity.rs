//! Identity types supplied by the external auth layer.
//!
//! The engine trusts these values as already verified: authentication,
//! session handling, and credential checks happen outside the core.

use serde::{Deserialize, Serialize};

use crate::booking::UserId;

/// Role discriminator for a request principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular venue customer.
    User,
    /// A venue administrator.
    Admin,
}

/// The verified principal behind a request.
///
/// # Examples
///
/// ```
/// use venua::{Actor, Role};
///
/// let admin = Actor::new(1, Role::Admin);
/// assert!(admin.is_admin());
///
/// let user = Actor::new(2, Role::User);
/// assert!(!user.is_admin());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The principal's user id.
    pub user_id: UserId,
    /// The principal's role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the actor carries the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Contact details for a user, resolved by the external person store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Lookup seam for user contact details.
///
/// The person tables live outside the core; this trait is how the engine
/// asks the collaborator for the name and email that go into a confirmation
/// notice. Returning `None` skips the notice.
pub trait ContactDirectory: Send + Sync {
    /// Resolves contact details for a user, if known.
    fn contact_for(&self, user_id: UserId) -> Option<Contact>;
}

/// Directory that knows nobody. The default when no person store is wired.
#[derive(Debug, Default)]
pub struct NoContacts;

impl ContactDirectory for NoContacts {
    fn contact_for(&self, _user_id: UserId) -> Option<Contact> {
        None
    }
}

/// Proof of a successful master-credential check.
///
/// Payment removal demands this token. Only the auth layer can decide when
/// to issue one; the core merely requires that it was issued.
#[derive(Debug)]
pub struct MasterCredential {
    _private: (),
}

impl MasterCredential {
    /// Issues a credential. Called by the auth collaborator after its own
    /// out-of-band verification succeeds.
    #[must_use]
    pub const fn issue() -> Self {
        Self { _private: () }
    }
}
