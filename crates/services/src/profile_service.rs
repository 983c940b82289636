use storage::repository::{ProfileRepository, ResultRepository};

use quiz_core::model::{QuizResult, Role, UserProfile};

use crate::error::ProfileServiceError;

/// Session profile flows: sign-in, profile edit, sign-out, attempt history.
///
/// There is no authentication; "signing in" writes a profile record and the
/// store is trusted from then on.
#[derive(Clone)]
pub struct ProfileService {
    profiles: ProfileRepository,
    results: ResultRepository,
}

impl ProfileService {
    #[must_use]
    pub fn new(profiles: ProfileRepository, results: ResultRepository) -> Self {
        Self { profiles, results }
    }

    /// Signs in as a regular user, creating the session profile record.
    ///
    /// # Errors
    ///
    /// Returns a field-scoped `ProfileError` for blank email or name, or
    /// `StoreError` if the store cannot be reached.
    pub async fn login(
        &self,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<UserProfile, ProfileServiceError> {
        self.sign_in(email, name, Role::User).await
    }

    /// Signs in with the admin role.
    ///
    /// There are no credentials to check; role gating is a UI concern.
    ///
    /// # Errors
    ///
    /// Returns a field-scoped `ProfileError` for blank email or name, or
    /// `StoreError` if the store cannot be reached.
    pub async fn login_admin(
        &self,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<UserProfile, ProfileServiceError> {
        self.sign_in(email, name, Role::Admin).await
    }

    async fn sign_in(
        &self,
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Result<UserProfile, ProfileServiceError> {
        let profile = UserProfile::new(email, name, role, None)?;
        self.profiles.set_current(&profile).await?;
        Ok(profile)
    }

    /// The signed-in profile, re-derived from the store on every call.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn current(&self) -> Result<Option<UserProfile>, ProfileServiceError> {
        Ok(self.profiles.current().await?)
    }

    /// Edits the owner's name and avatar; email and role never change.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without a session profile, a field-scoped
    /// `ProfileError` for a blank name, or `StoreError` if the store cannot
    /// be reached.
    pub async fn update_profile(
        &self,
        name: impl Into<String>,
        profile_image: Option<String>,
    ) -> Result<UserProfile, ProfileServiceError> {
        let current = self
            .profiles
            .current()
            .await?
            .ok_or(ProfileServiceError::NotSignedIn)?;

        // Revalidate through the constructor so a blank name is rejected the
        // same way it is at sign-in.
        let updated = UserProfile::new(
            current.email().to_owned(),
            name,
            current.role(),
            profile_image,
        )?;
        self.profiles.set_current(&updated).await?;
        Ok(updated)
    }

    /// Signs the session out. Directory entries and counters stay behind.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn logout(&self) -> Result<(), ProfileServiceError> {
        Ok(self.profiles.clear_current().await?)
    }

    /// The signed-in user's attempt history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without a session profile, or `StoreError` if
    /// the store cannot be reached.
    pub async fn history(&self) -> Result<Vec<QuizResult>, ProfileServiceError> {
        let current = self
            .profiles
            .current()
            .await?
            .ok_or(ProfileServiceError::NotSignedIn)?;
        Ok(self.results.history(current.email()).await?)
    }
}
