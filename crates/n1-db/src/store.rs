use n1_core::MarketError;
use n1_core::store::Store;
use rusqlite::Connection;

use crate::drop_repo::DropRepo;
use crate::event_repo::EventRepo;
use crate::offer_repo::OfferRepo;
use crate::request_repo::RequestRepo;
use crate::thread_repo::ThreadRepo;
use crate::user_repo::UserRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for DbStore {
    type Requests<'a>
        = RequestRepo<'a>
    where
        Self: 'a;
    type Offers<'a>
        = OfferRepo<'a>
    where
        Self: 'a;
    type Users<'a>
        = UserRepo<'a>
    where
        Self: 'a;
    type Threads<'a>
        = ThreadRepo<'a>
    where
        Self: 'a;
    type Drops<'a>
        = DropRepo<'a>
    where
        Self: 'a;
    type Events<'a>
        = EventRepo<'a>
    where
        Self: 'a;

    fn requests(&self) -> Self::Requests<'_> {
        RequestRepo::new(&self.conn)
    }

    fn offers(&self) -> Self::Offers<'_> {
        OfferRepo::new(&self.conn)
    }

    fn users(&self) -> Self::Users<'_> {
        UserRepo::new(&self.conn)
    }

    fn threads(&self) -> Self::Threads<'_> {
        ThreadRepo::new(&self.conn)
    }

    fn drops(&self) -> Self::Drops<'_> {
        DropRepo::new(&self.conn)
    }

    fn events(&self) -> Self::Events<'_> {
        EventRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, MarketError>
    where
        F: FnOnce(&Self) -> Result<T, MarketError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|err| MarketError::Internal {
                message: err.to_string(),
            })?;
        let result = f(self);
        match result {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(|err| MarketError::Internal {
                        message: err.to_string(),
                    })?;
                Ok(value)
            }
            Err(err) => {
                self.conn
                    .execute_batch("ROLLBACK")
                    .map_err(|rollback_err| MarketError::Internal {
                        message: rollback_err.to_string(),
                    })?;
                Err(err)
            }
        }
    }
}
