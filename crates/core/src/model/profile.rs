use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("email cannot be empty")]
    EmptyEmail,

    #[error("name cannot be empty")]
    EmptyName,
}

//
// ─── ROLE ──────────────────────────────────────────────────────────────────────
//

/// Access level of a stored profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Wire name used in stored payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Lenient decode: anything that is not exactly `admin` is a user.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        if value == "admin" { Role::Admin } else { Role::User }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

/// A stored user profile.
///
/// The email doubles as the user's identity; there is no authentication
/// beyond this record. The profile is re-derived from the store on every
/// load and held only for the lifetime of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    email: String,
    name: String,
    role: Role,
    profile_image: Option<String>,
}

impl UserProfile {
    /// Creates a profile, rejecting blank identity fields.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::EmptyEmail` or `ProfileError::EmptyName` when
    /// the corresponding field is empty or whitespace-only.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        profile_image: Option<String>,
    ) -> Result<Self, ProfileError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(ProfileError::EmptyEmail);
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }

        Ok(Self {
            email,
            name,
            role,
            profile_image,
        })
    }

    /// Re-hydrates a profile from storage without validation.
    #[must_use]
    pub fn from_persisted(
        email: String,
        name: String,
        role: Role,
        profile_image: Option<String>,
    ) -> Self {
        Self {
            email,
            name,
            role,
            profile_image,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn profile_image(&self) -> Option<&str> {
        self.profile_image.as_deref()
    }

    /// Returns a copy with the owner-editable fields replaced.
    ///
    /// Email and role are identity and never change through a profile edit.
    #[must_use]
    pub fn with_edits(&self, name: String, profile_image: Option<String>) -> Self {
        Self {
            email: self.email.clone(),
            name,
            role: self.role,
            profile_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_blank_email() {
        let err = UserProfile::new("  ", "Aziza", Role::User, None).unwrap_err();
        assert_eq!(err, ProfileError::EmptyEmail);
    }

    #[test]
    fn new_rejects_blank_name() {
        let err = UserProfile::new("a@b.uz", "", Role::User, None).unwrap_err();
        assert_eq!(err, ProfileError::EmptyName);
    }

    #[test]
    fn role_wire_roundtrip() {
        assert_eq!(Role::from_wire("admin"), Role::Admin);
        assert_eq!(Role::from_wire("user"), Role::User);
        assert_eq!(Role::from_wire("moderator"), Role::User);
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn with_edits_keeps_identity() {
        let profile = UserProfile::new("a@b.uz", "Aziza", Role::Admin, None).unwrap();
        let edited = profile.with_edits("Aziza K.".into(), Some("avatar-3".into()));
        assert_eq!(edited.email(), "a@b.uz");
        assert!(edited.role().is_admin());
        assert_eq!(edited.name(), "Aziza K.");
        assert_eq!(edited.profile_image(), Some("avatar-3"));
    }
}
