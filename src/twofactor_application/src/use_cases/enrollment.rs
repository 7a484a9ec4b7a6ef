use twofactor_core::{User, UserSettings, UserSettingsError};

/// Decides whether a user must pass the second factor.
///
/// With `force_all` every user is enrolled regardless of their own setting.
#[derive(Debug, Clone)]
pub struct EnrollmentPolicy<S>
where
    S: UserSettings,
{
    settings: S,
    force_all: bool,
}

impl<S> EnrollmentPolicy<S>
where
    S: UserSettings,
{
    pub fn new(settings: S, force_all: bool) -> Self {
        Self {
            settings,
            force_all,
        }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn force_all(&self) -> bool {
        self.force_all
    }

    #[tracing::instrument(
        name = "EnrollmentPolicy::require_second_factor",
        skip_all,
        fields(user_id = %user.id())
    )]
    pub async fn require_second_factor(&self, user: &User) -> Result<bool, UserSettingsError> {
        if self.force_all {
            return Ok(true);
        }
        match self.settings.second_factor_enabled(user.id()).await {
            Err(UserSettingsError::UserNotFound) => Ok(false),
            other => other,
        }
    }
}
