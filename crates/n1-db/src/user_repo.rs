use crate::util::{decode_json, encode_json, from_rfc3339, to_rfc3339};
use n1_core::error::UserError;
use n1_core::types::{RegisterUserInput, UpdateProfileInput, User, UserFilter, UserId};
use n1_core::users::UserRepository;
use rusqlite::Connection;

pub struct UserRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> UserRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const USER_COLUMNS: &str = "id, name, email, is_verified, karma, eco_impact, campus_credits, skills, major, graduation_year, created_at, updated_at";

impl<'a> UserRepository for UserRepo<'a> {
    fn create(&self, input: RegisterUserInput) -> Result<User, UserError> {
        let now = chrono::Utc::now();
        let user = User {
            id: UserId::generate(),
            name: input.name,
            email: input.email,
            is_verified: false,
            karma: 0,
            eco_impact: 0,
            campus_credits: 0,
            skills: input.skills,
            major: input.major,
            graduation_year: input.graduation_year,
            created_at: now,
            updated_at: now,
        };

        let sql = "INSERT INTO users (id, name, email, is_verified, karma, eco_impact, campus_credits, skills, major, graduation_year, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
        let params = (
            user.id.as_str(),
            user.name.clone(),
            user.email.clone(),
            user.is_verified,
            user.karma,
            user.eco_impact,
            user.campus_credits,
            encode_json(&user.skills).map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?,
            user.major.clone(),
            user.graduation_year,
            to_rfc3339(&user.created_at),
            to_rfc3339(&user.updated_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(user)
    }

    fn get(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([id.as_str()])
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_user_row(row).map(Some)
    }

    fn list(&self, filter: UserFilter) -> Result<Vec<User>, UserError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt.query([]).map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })? {
            users.push(map_user_row(row)?);
        }
        Ok(users
            .into_iter()
            .filter(|user| {
                filter
                    .is_verified
                    .is_none_or(|verified| user.is_verified == verified)
            })
            .filter(|user| {
                filter
                    .skill
                    .as_ref()
                    .is_none_or(|skill| user.skills.iter().any(|value| value == skill))
            })
            .collect())
    }

    fn update_profile(&self, id: &UserId, input: UpdateProfileInput) -> Result<User, UserError> {
        let mut user = self.get(id)?.ok_or(UserError::NotFound)?;
        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(skills) = input.skills {
            user.skills = skills;
        }
        if let Some(major) = input.major {
            user.major = Some(major);
        }
        if let Some(graduation_year) = input.graduation_year {
            user.graduation_year = Some(graduation_year);
        }
        user.updated_at = chrono::Utc::now();

        let sql = "UPDATE users SET name = ?1, skills = ?2, major = ?3, graduation_year = ?4, updated_at = ?5 WHERE id = ?6";
        let params = (
            user.name.clone(),
            encode_json(&user.skills).map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?,
            user.major.clone(),
            user.graduation_year,
            to_rfc3339(&user.updated_at),
            user.id.as_str(),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(user)
    }

    fn set_standing(
        &self,
        id: &UserId,
        karma: i64,
        campus_credits: i64,
    ) -> Result<User, UserError> {
        let mut user = self.get(id)?.ok_or(UserError::NotFound)?;
        user.karma = karma;
        user.campus_credits = campus_credits;
        user.updated_at = chrono::Utc::now();

        let sql = "UPDATE users SET karma = ?1, campus_credits = ?2, updated_at = ?3 WHERE id = ?4";
        let params = (
            user.karma,
            user.campus_credits,
            to_rfc3339(&user.updated_at),
            user.id.as_str(),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(user)
    }
}

fn map_user_row(row: &rusqlite::Row<'_>) -> Result<User, UserError> {
    let id: String = row.get(0).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let name: String = row.get(1).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let email: String = row.get(2).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let is_verified: bool = row.get(3).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let karma: i64 = row.get(4).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let eco_impact: i64 = row.get(5).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let campus_credits: i64 = row.get(6).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let skills: String = row.get(7).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let major: Option<String> = row.get(8).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let graduation_year: Option<i32> = row.get(9).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let created_at: String = row.get(10).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let updated_at: String = row.get(11).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;

    let id = UserId::new(id).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let skills: Vec<String> = decode_json(&skills).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;

    Ok(User {
        id,
        name,
        email,
        is_verified,
        karma,
        eco_impact,
        campus_credits,
        skills,
        major,
        graduation_year,
        created_at: from_rfc3339(&created_at).map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })?,
        updated_at: from_rfc3339(&updated_at).map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })?,
    })
}
