pub mod drop;
pub mod enums;
pub mod event;
pub mod ids;
pub mod io;
pub mod offer;
pub mod request;
pub mod thread;
pub mod user;

pub use drop::FlashDrop;
pub use enums::{Category, OfferStatus, RequestStatus};
pub use event::{Event, EventBody};
pub use ids::{DropId, IdError, MessageId, OfferId, RequestId, ThreadId, UserId};
pub use io::{
    CreateDropInput, CreateRequestInput, OfferFilter, RegisterUserInput, RequestFilter,
    SendMessageInput, SubmitOfferInput, UpdateProfileInput, UserFilter,
};
pub use offer::Offer;
pub use request::Request;
pub use thread::{Message, Thread};
pub use user::User;
