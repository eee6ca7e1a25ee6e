use chatwire_auth_types::token::validate_access_token;

use crate::domain::repository::UserRepository;
use crate::domain::types::Principal;
use crate::error::AuthServiceError;

/// Reconstruct a verified principal from a bearer credential.
///
/// The user's live status is re-read from the store on every call, so
/// deactivating an account rejects the very next request even if the
/// credential itself is still unexpired.
pub struct ResolvePrincipalUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
    pub primary_secret: String,
}

impl<U> ResolvePrincipalUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(&self, credential: &str) -> Result<Principal, AuthServiceError> {
        let info = validate_access_token(credential, &self.primary_secret)
            .map_err(|_| AuthServiceError::Unauthenticated)?;

        let user = self
            .users
            .find_by_id(info.user_id)
            .await?
            .ok_or(AuthServiceError::Unauthenticated)?;

        if !user.is_active {
            return Err(AuthServiceError::Unauthenticated);
        }

        Ok(Principal {
            id: user.id,
            phone_number: user.phone_number,
            name: user.name,
            email: user.email,
            is_verified: user.is_verified,
        })
    }
}
