use crate::util::{decode_enum, decode_json, encode_enum, encode_json, from_rfc3339, to_rfc3339};
use n1_core::error::RequestError;
use n1_core::requests::RequestRepository;
use n1_core::types::{
    CreateRequestInput, Request, RequestFilter, RequestId, RequestStatus, UserId,
};
use rusqlite::Connection;

pub struct RequestRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> RequestRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const REQUEST_COLUMNS: &str = "id, owner_id, title, description, category, budget, location, is_remote, deadline, status, bid_count, tags, version, created_at, updated_at";

impl<'a> RequestRepository for RequestRepo<'a> {
    fn create(&self, input: CreateRequestInput) -> Result<Request, RequestError> {
        let now = chrono::Utc::now();
        let request = Request {
            id: RequestId::generate(),
            owner_id: input.owner_id,
            title: input.title,
            description: input.description,
            category: input.category,
            budget: input.budget,
            location: input.location,
            is_remote: input.is_remote,
            deadline: input.deadline,
            status: RequestStatus::Open,
            bid_count: 0,
            tags: input.tags,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let sql = "INSERT INTO requests (id, owner_id, title, description, category, budget, location, is_remote, deadline, status, bid_count, tags, version, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";
        let params = (
            request.id.as_str(),
            request.owner_id.as_str(),
            request.title.clone(),
            request.description.clone(),
            encode_enum(&request.category).map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?,
            request.budget,
            request.location.clone(),
            request.is_remote,
            to_rfc3339(&request.deadline),
            encode_enum(&request.status).map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?,
            request.bid_count,
            encode_json(&request.tags).map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?,
            request.version,
            to_rfc3339(&request.created_at),
            to_rfc3339(&request.updated_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(request)
    }

    fn get(&self, id: &RequestId) -> Result<Option<Request>, RequestError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?1");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([id.as_str()])
            .map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| RequestError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_request_row(row).map(Some)
    }

    fn list(&self, filter: RequestFilter) -> Result<Vec<Request>, RequestError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM requests ORDER BY created_at DESC");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt.query([]).map_err(|err| RequestError::InvalidInput {
            message: err.to_string(),
        })?;
        let mut requests = Vec::new();
        while let Some(row) = rows.next().map_err(|err| RequestError::InvalidInput {
            message: err.to_string(),
        })? {
            requests.push(map_request_row(row)?);
        }
        Ok(filter_requests(requests, &filter))
    }

    fn update(&self, request: &Request, expected_version: i64) -> Result<Request, RequestError> {
        let now = chrono::Utc::now();
        let sql = "UPDATE requests SET title = ?1, description = ?2, category = ?3, budget = ?4, location = ?5, is_remote = ?6, deadline = ?7, status = ?8, bid_count = ?9, tags = ?10, version = ?11, updated_at = ?12 WHERE id = ?13 AND version = ?14";
        let params = (
            request.title.clone(),
            request.description.clone(),
            encode_enum(&request.category).map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?,
            request.budget,
            request.location.clone(),
            request.is_remote,
            to_rfc3339(&request.deadline),
            encode_enum(&request.status).map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?,
            request.bid_count,
            encode_json(&request.tags).map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?,
            expected_version + 1,
            to_rfc3339(&now),
            request.id.as_str(),
            expected_version,
        );
        let affected = self
            .conn
            .execute(sql, params)
            .map_err(|err| RequestError::InvalidInput {
                message: err.to_string(),
            })?;
        if affected == 0 {
            return match self.get(&request.id)? {
                Some(_) => Err(RequestError::Conflict {
                    message: format!("request {} was modified concurrently", request.id.as_str()),
                }),
                None => Err(RequestError::NotFound),
            };
        }
        self.get(&request.id)?.ok_or(RequestError::NotFound)
    }
}

fn filter_requests(requests: Vec<Request>, filter: &RequestFilter) -> Vec<Request> {
    requests
        .into_iter()
        .filter(|request| match_owner(request, filter.owner_id.as_ref()))
        .filter(|request| match_status(request, filter.status.as_deref()))
        .filter(|request| {
            filter
                .category
                .is_none_or(|category| request.category == category)
        })
        .filter(|request| {
            filter
                .tag
                .as_ref()
                .is_none_or(|tag| request.tags.iter().any(|value| value == tag))
        })
        .collect()
}

fn match_owner(request: &Request, owner_id: Option<&UserId>) -> bool {
    owner_id.is_none_or(|owner| &request.owner_id == owner)
}

fn match_status(request: &Request, statuses: Option<&[RequestStatus]>) -> bool {
    statuses.is_none_or(|statuses| statuses.contains(&request.status))
}

fn map_request_row(row: &rusqlite::Row<'_>) -> Result<Request, RequestError> {
    let id: String = row.get(0).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let owner_id: String = row.get(1).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let title: String = row.get(2).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let description: String = row.get(3).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let category: String = row.get(4).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let budget: i64 = row.get(5).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let location: Option<String> = row.get(6).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let is_remote: bool = row.get(7).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let deadline: String = row.get(8).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let status: String = row.get(9).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let bid_count: i64 = row.get(10).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let tags: String = row.get(11).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let version: i64 = row.get(12).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let created_at: String = row.get(13).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let updated_at: String = row.get(14).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;

    let id = RequestId::new(id).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let owner_id = UserId::new(owner_id).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let category = decode_enum(&category).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let status = decode_enum(&status).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;
    let tags: Vec<String> = decode_json(&tags).map_err(|err| RequestError::InvalidInput {
        message: err.to_string(),
    })?;

    Ok(Request {
        id,
        owner_id,
        title,
        description,
        category,
        budget,
        location,
        is_remote,
        deadline: from_rfc3339(&deadline).map_err(|err| RequestError::InvalidInput {
            message: err.to_string(),
        })?,
        status,
        bid_count,
        tags,
        version,
        created_at: from_rfc3339(&created_at).map_err(|err| RequestError::InvalidInput {
            message: err.to_string(),
        })?,
        updated_at: from_rfc3339(&updated_at).map_err(|err| RequestError::InvalidInput {
            message: err.to_string(),
        })?,
    })
}
