use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};
use chrono::{DateTime, Utc};
use n1_core::error::OfferError;
use n1_core::offers::OfferRepository;
use n1_core::types::{
    Offer, OfferFilter, OfferId, OfferStatus, RequestId, SubmitOfferInput, UserId,
};
use rusqlite::Connection;

pub struct OfferRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> OfferRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const OFFER_COLUMNS: &str =
    "id, request_id, bidder_id, amount, message, status, created_at, decided_at";

impl<'a> OfferRepository for OfferRepo<'a> {
    fn create(
        &self,
        request_id: &RequestId,
        input: SubmitOfferInput,
    ) -> Result<Offer, OfferError> {
        let now = chrono::Utc::now();
        let offer = Offer {
            id: OfferId::generate(),
            request_id: request_id.clone(),
            bidder_id: input.bidder_id,
            amount: input.amount,
            message: input.message,
            status: OfferStatus::Pending,
            created_at: now,
            decided_at: None,
        };

        let sql = "INSERT INTO offers (id, request_id, bidder_id, amount, message, status, created_at, decided_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
        let params = (
            offer.id.as_str(),
            offer.request_id.as_str(),
            offer.bidder_id.as_str(),
            offer.amount,
            offer.message.clone(),
            encode_enum(&offer.status).map_err(|err| OfferError::InvalidInput {
                message: err.to_string(),
            })?,
            to_rfc3339(&offer.created_at),
            offer.decided_at.map(|value| to_rfc3339(&value)),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| OfferError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(offer)
    }

    fn get(&self, id: &OfferId) -> Result<Option<Offer>, OfferError> {
        let sql = format!("SELECT {OFFER_COLUMNS} FROM offers WHERE id = ?1");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| OfferError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([id.as_str()])
            .map_err(|err| OfferError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| OfferError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_offer_row(row).map(Some)
    }

    fn list(&self, filter: OfferFilter) -> Result<Vec<Offer>, OfferError> {
        let sql = format!("SELECT {OFFER_COLUMNS} FROM offers ORDER BY created_at ASC");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| OfferError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt.query([]).map_err(|err| OfferError::InvalidInput {
            message: err.to_string(),
        })?;
        let mut offers = Vec::new();
        while let Some(row) = rows.next().map_err(|err| OfferError::InvalidInput {
            message: err.to_string(),
        })? {
            offers.push(map_offer_row(row)?);
        }
        Ok(filter_offers(offers, &filter))
    }

    fn list_for_request(&self, request_id: &RequestId) -> Result<Vec<Offer>, OfferError> {
        let sql = format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE request_id = ?1 ORDER BY created_at ASC"
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| OfferError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([request_id.as_str()])
            .map_err(|err| OfferError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut offers = Vec::new();
        while let Some(row) = rows.next().map_err(|err| OfferError::InvalidInput {
            message: err.to_string(),
        })? {
            offers.push(map_offer_row(row)?);
        }
        Ok(offers)
    }

    fn set_status(
        &self,
        id: &OfferId,
        status: OfferStatus,
        decided_at: Option<DateTime<Utc>>,
    ) -> Result<Offer, OfferError> {
        let mut offer = self.get(id)?.ok_or(OfferError::NotFound)?;
        offer.status = status;
        offer.decided_at = decided_at;

        let sql = "UPDATE offers SET status = ?1, decided_at = ?2 WHERE id = ?3";
        let params = (
            encode_enum(&offer.status).map_err(|err| OfferError::InvalidInput {
                message: err.to_string(),
            })?,
            offer.decided_at.map(|value| to_rfc3339(&value)),
            offer.id.as_str(),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| OfferError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(offer)
    }
}

fn filter_offers(offers: Vec<Offer>, filter: &OfferFilter) -> Vec<Offer> {
    offers
        .into_iter()
        .filter(|offer| {
            filter
                .request_id
                .as_ref()
                .is_none_or(|request_id| &offer.request_id == request_id)
        })
        .filter(|offer| {
            filter
                .bidder_id
                .as_ref()
                .is_none_or(|bidder_id| &offer.bidder_id == bidder_id)
        })
        .filter(|offer| {
            filter
                .status
                .as_deref()
                .is_none_or(|statuses| statuses.contains(&offer.status))
        })
        .collect()
}

fn map_offer_row(row: &rusqlite::Row<'_>) -> Result<Offer, OfferError> {
    let id: String = row.get(0).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;
    let request_id: String = row.get(1).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;
    let bidder_id: String = row.get(2).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;
    let amount: i64 = row.get(3).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;
    let message: String = row.get(4).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;
    let status: String = row.get(5).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;
    let created_at: String = row.get(6).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;
    let decided_at: Option<String> = row.get(7).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;

    let id = OfferId::new(id).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;
    let request_id = RequestId::new(request_id).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;
    let bidder_id = UserId::new(bidder_id).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;
    let status = decode_enum(&status).map_err(|err| OfferError::InvalidInput {
        message: err.to_string(),
    })?;

    Ok(Offer {
        id,
        request_id,
        bidder_id,
        amount,
        message,
        status,
        created_at: from_rfc3339(&created_at).map_err(|err| OfferError::InvalidInput {
            message: err.to_string(),
        })?,
        decided_at: decided_at
            .map(|value| from_rfc3339(&value))
            .transpose()
            .map_err(|err| OfferError::InvalidInput {
                message: err.to_string(),
            })?,
    })
}
