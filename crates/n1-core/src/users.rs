use crate::error::UserError;
use crate::types::{RegisterUserInput, UpdateProfileInput, User, UserFilter, UserId};

pub trait UserRepository {
    fn create(&self, input: RegisterUserInput) -> Result<User, UserError>;
    fn get(&self, id: &UserId) -> Result<Option<User>, UserError>;
    fn list(&self, filter: UserFilter) -> Result<Vec<User>, UserError>;
    fn update_profile(&self, id: &UserId, input: UpdateProfileInput) -> Result<User, UserError>;
    /// Overwrites the reputation counters with already-computed values.
    fn set_standing(
        &self,
        id: &UserId,
        karma: i64,
        campus_credits: i64,
    ) -> Result<User, UserError>;
}
