use crate::MarketError;
use crate::drops::DropRepository;
use crate::events::EventRepository;
use crate::offers::OfferRepository;
use crate::requests::RequestRepository;
use crate::threads::ThreadRepository;
use crate::users::UserRepository;

pub trait Store {
    type Requests<'a>: RequestRepository
    where
        Self: 'a;
    type Offers<'a>: OfferRepository
    where
        Self: 'a;
    type Users<'a>: UserRepository
    where
        Self: 'a;
    type Threads<'a>: ThreadRepository
    where
        Self: 'a;
    type Drops<'a>: DropRepository
    where
        Self: 'a;
    type Events<'a>: EventRepository
    where
        Self: 'a;

    fn requests(&self) -> Self::Requests<'_>;
    fn offers(&self) -> Self::Offers<'_>;
    fn users(&self) -> Self::Users<'_>;
    fn threads(&self) -> Self::Threads<'_>;
    fn drops(&self) -> Self::Drops<'_>;
    fn events(&self) -> Self::Events<'_>;

    fn with_tx<F, T>(&self, f: F) -> Result<T, MarketError>
    where
        F: FnOnce(&Self) -> Result<T, MarketError>;
}
