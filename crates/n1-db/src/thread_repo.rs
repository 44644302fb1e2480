use crate::util::{from_rfc3339, to_rfc3339};
use chrono::{DateTime, Utc};
use n1_core::error::ThreadError;
use n1_core::threads::ThreadRepository;
use n1_core::types::{Message, MessageId, RequestId, Thread, ThreadId, UserId};
use rusqlite::Connection;

pub struct ThreadRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> ThreadRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const THREAD_COLUMNS: &str = "id, request_id, seeker_id, bidder_id, expires_at, created_at";

impl<'a> ThreadRepository for ThreadRepo<'a> {
    fn create(
        &self,
        request_id: &RequestId,
        seeker_id: &UserId,
        bidder_id: &UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<Thread, ThreadError> {
        let now = chrono::Utc::now();
        let thread = Thread {
            id: ThreadId::generate(),
            request_id: request_id.clone(),
            seeker_id: seeker_id.clone(),
            bidder_id: bidder_id.clone(),
            expires_at,
            created_at: now,
        };

        let sql = "INSERT INTO threads (id, request_id, seeker_id, bidder_id, expires_at, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
        let params = (
            thread.id.as_str(),
            thread.request_id.as_str(),
            thread.seeker_id.as_str(),
            thread.bidder_id.as_str(),
            to_rfc3339(&thread.expires_at),
            to_rfc3339(&thread.created_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(thread)
    }

    fn get(&self, id: &ThreadId) -> Result<Option<Thread>, ThreadError> {
        let sql = format!("SELECT {THREAD_COLUMNS} FROM threads WHERE id = ?1");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([id.as_str()])
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_thread_row(row).map(Some)
    }

    fn find(
        &self,
        request_id: &RequestId,
        bidder_id: &UserId,
    ) -> Result<Option<Thread>, ThreadError> {
        let sql =
            format!("SELECT {THREAD_COLUMNS} FROM threads WHERE request_id = ?1 AND bidder_id = ?2");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([request_id.as_str(), bidder_id.as_str()])
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_thread_row(row).map(Some)
    }

    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Thread>, ThreadError> {
        let sql = format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE seeker_id = ?1 OR bidder_id = ?1 ORDER BY created_at DESC"
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([user_id.as_str()])
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut threads = Vec::new();
        while let Some(row) = rows.next().map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })? {
            threads.push(map_thread_row(row)?);
        }
        Ok(threads)
    }

    fn add_message(
        &self,
        thread_id: &ThreadId,
        sender_id: &UserId,
        body: &str,
    ) -> Result<Message, ThreadError> {
        let now = chrono::Utc::now();
        let message = Message {
            id: MessageId::generate(),
            thread_id: thread_id.clone(),
            sender_id: sender_id.clone(),
            body: body.to_string(),
            created_at: now,
        };

        let sql = "INSERT INTO messages (id, thread_id, sender_id, body, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";
        let params = (
            message.id.as_str(),
            message.thread_id.as_str(),
            message.sender_id.as_str(),
            message.body.clone(),
            to_rfc3339(&message.created_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(message)
    }

    fn messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, ThreadError> {
        let sql = "SELECT id, thread_id, sender_id, body, created_at FROM messages WHERE thread_id = ?1 ORDER BY created_at ASC, id ASC";
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([thread_id.as_str()])
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next().map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })? {
            messages.push(map_message_row(row)?);
        }
        Ok(messages)
    }

    fn expire_for_request(
        &self,
        request_id: &RequestId,
        at: DateTime<Utc>,
    ) -> Result<u64, ThreadError> {
        let sql = "UPDATE threads SET expires_at = ?1 WHERE request_id = ?2 AND expires_at > ?1";
        let affected = self
            .conn
            .execute(sql, (to_rfc3339(&at), request_id.as_str()))
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        Ok(affected as u64)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, ThreadError> {
        let cutoff = to_rfc3339(&now);
        self.conn
            .execute(
                "DELETE FROM messages WHERE thread_id IN (SELECT id FROM threads WHERE expires_at <= ?1)",
                [cutoff.as_str()],
            )
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        let affected = self
            .conn
            .execute(
                "DELETE FROM threads WHERE expires_at <= ?1",
                [cutoff.as_str()],
            )
            .map_err(|err| ThreadError::InvalidInput {
                message: err.to_string(),
            })?;
        Ok(affected as u64)
    }
}

fn map_thread_row(row: &rusqlite::Row<'_>) -> Result<Thread, ThreadError> {
    let id: String = row.get(0).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;
    let request_id: String = row.get(1).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;
    let seeker_id: String = row.get(2).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;
    let bidder_id: String = row.get(3).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;
    let expires_at: String = row.get(4).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;
    let created_at: String = row.get(5).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;

    Ok(Thread {
        id: ThreadId::new(id).map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?,
        request_id: RequestId::new(request_id).map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?,
        seeker_id: UserId::new(seeker_id).map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?,
        bidder_id: UserId::new(bidder_id).map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?,
        expires_at: from_rfc3339(&expires_at).map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?,
        created_at: from_rfc3339(&created_at).map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?,
    })
}

fn map_message_row(row: &rusqlite::Row<'_>) -> Result<Message, ThreadError> {
    let id: String = row.get(0).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;
    let thread_id: String = row.get(1).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;
    let sender_id: String = row.get(2).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;
    let body: String = row.get(3).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;
    let created_at: String = row.get(4).map_err(|err| ThreadError::InvalidInput {
        message: err.to_string(),
    })?;

    Ok(Message {
        id: MessageId::new(id).map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?,
        thread_id: ThreadId::new(thread_id).map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?,
        sender_id: UserId::new(sender_id).map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?,
        body,
        created_at: from_rfc3339(&created_at).map_err(|err| ThreadError::InvalidInput {
            message: err.to_string(),
        })?,
    })
}
