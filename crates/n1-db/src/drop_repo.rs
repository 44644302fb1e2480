use crate::util::{from_rfc3339, to_rfc3339};
use chrono::{DateTime, Utc};
use n1_core::drops::DropRepository;
use n1_core::error::DropError;
use n1_core::types::{CreateDropInput, DropId, FlashDrop, RequestId};
use rusqlite::Connection;

pub struct DropRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> DropRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn request_ids(&self, drop_id: &DropId) -> Result<Vec<RequestId>, DropError> {
        let mut stmt = self
            .conn
            .prepare("SELECT request_id FROM drop_requests WHERE drop_id = ?1 ORDER BY request_id ASC")
            .map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([drop_id.as_str()])
            .map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().map_err(|err| DropError::InvalidInput {
            message: err.to_string(),
        })? {
            let value: String = row.get(0).map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })?;
            ids.push(
                RequestId::new(value).map_err(|err| DropError::InvalidInput {
                    message: err.to_string(),
                })?,
            );
        }
        Ok(ids)
    }

    fn map_drop_row(&self, row: &rusqlite::Row<'_>) -> Result<FlashDrop, DropError> {
        let id: String = row.get(0).map_err(|err| DropError::InvalidInput {
            message: err.to_string(),
        })?;
        let title: String = row.get(1).map_err(|err| DropError::InvalidInput {
            message: err.to_string(),
        })?;
        let ends_at: String = row.get(2).map_err(|err| DropError::InvalidInput {
            message: err.to_string(),
        })?;
        let created_at: String = row.get(3).map_err(|err| DropError::InvalidInput {
            message: err.to_string(),
        })?;

        let id = DropId::new(id).map_err(|err| DropError::InvalidInput {
            message: err.to_string(),
        })?;
        let request_ids = self.request_ids(&id)?;

        Ok(FlashDrop {
            id,
            title,
            ends_at: from_rfc3339(&ends_at).map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })?,
            request_ids,
            created_at: from_rfc3339(&created_at).map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })?,
        })
    }
}

impl<'a> DropRepository for DropRepo<'a> {
    fn create(&self, input: CreateDropInput) -> Result<FlashDrop, DropError> {
        let now = chrono::Utc::now();
        let drop = FlashDrop {
            id: DropId::generate(),
            title: input.title,
            ends_at: input.ends_at,
            request_ids: input.request_ids,
            created_at: now,
        };

        let sql = "INSERT INTO drops (id, title, ends_at, created_at) VALUES (?1, ?2, ?3, ?4)";
        let params = (
            drop.id.as_str(),
            drop.title.clone(),
            to_rfc3339(&drop.ends_at),
            to_rfc3339(&drop.created_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })?;

        for request_id in &drop.request_ids {
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO drop_requests (drop_id, request_id) VALUES (?1, ?2)",
                    (drop.id.as_str(), request_id.as_str()),
                )
                .map_err(|err| DropError::InvalidInput {
                    message: err.to_string(),
                })?;
        }

        Ok(drop)
    }

    fn get(&self, id: &DropId) -> Result<Option<FlashDrop>, DropError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, ends_at, created_at FROM drops WHERE id = ?1")
            .map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([id.as_str()])
            .map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| DropError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        let drop = self.map_drop_row(row)?;
        Ok(Some(drop))
    }

    fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<FlashDrop>, DropError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, ends_at, created_at FROM drops WHERE ends_at > ?1 ORDER BY ends_at ASC")
            .map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([to_rfc3339(&now)])
            .map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut drops = Vec::new();
        while let Some(row) = rows.next().map_err(|err| DropError::InvalidInput {
            message: err.to_string(),
        })? {
            drops.push(self.map_drop_row(row)?);
        }
        Ok(drops)
    }

    fn participant_count(&self, id: &DropId) -> Result<i64, DropError> {
        let sql = "SELECT COUNT(DISTINCT bidder_id) FROM offers WHERE request_id IN (SELECT request_id FROM drop_requests WHERE drop_id = ?1)";
        self.conn
            .query_row(sql, [id.as_str()], |row| row.get(0))
            .map_err(|err| DropError::InvalidInput {
                message: err.to_string(),
            })
    }
}
