use crate::drops::DropRepository;
use crate::error::{
    DropError, MarketError, OfferError, RequestError, ThreadError, UserError,
};
use crate::events::EventRepository;
use crate::karma::{COMPLETION_BIDDER_KARMA, COMPLETION_SEEKER_KARMA, apply_karma};
use crate::offers::OfferRepository;
use crate::requests::RequestRepository;
use crate::store::Store;
use crate::threads::ThreadRepository;
use crate::types::event::EventBody;
use crate::types::io::{
    CreateDropInput, CreateRequestInput, OfferFilter, RegisterUserInput, RequestFilter,
    SendMessageInput, SubmitOfferInput, UpdateProfileInput, UserFilter,
};
use crate::types::{
    DropId, FlashDrop, Message, Offer, OfferId, OfferStatus, Request, RequestId, RequestStatus,
    Thread, ThreadId, User, UserId,
};
use crate::users::UserRepository;
use crate::validation::{
    validate_create_request, validate_register_user, validate_request_status_transition,
    validate_submit_offer,
};
use chrono::{DateTime, Duration, Utc};
use n1_events::bus::EventBus;
use n1_events::types::{EventRecord, EventSource};

/// Chat threads live this long after opening before messages auto-delete.
pub const THREAD_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub source: EventSource,
    pub correlation_id: Option<String>,
}

impl RequestContext {
    pub fn new(source: EventSource, correlation_id: Option<String>) -> Self {
        Self {
            source,
            correlation_id,
        }
    }
}

pub struct Marketplace<S: Store> {
    store: S,
    event_bus: EventBus,
}

impl<S: Store> Marketplace<S> {
    pub fn new(store: S, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    pub fn requests(&self) -> RequestsApi<'_, S> {
        RequestsApi { core: self }
    }

    pub fn offers(&self) -> OffersApi<'_, S> {
        OffersApi { core: self }
    }

    pub fn users(&self) -> UsersApi<'_, S> {
        UsersApi { core: self }
    }

    pub fn threads(&self) -> ThreadsApi<'_, S> {
        ThreadsApi { core: self }
    }

    pub fn drops(&self) -> DropsApi<'_, S> {
        DropsApi { core: self }
    }

    pub fn events(&self) -> EventsApi<'_, S> {
        EventsApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn with_events<T, F>(&self, ctx: &RequestContext, f: F) -> Result<T, MarketError>
    where
        F: FnOnce(&S) -> Result<(T, Vec<EventBody>), MarketError>,
    {
        let (value, records) = self.store.with_tx(|store| {
            let (value, bodies) = f(store)?;
            let mut records = Vec::new();
            for body in bodies {
                let record = build_event_record(ctx, body)?;
                let record = store.events().append(record)?;
                records.push(record);
            }
            Ok((value, records))
        })?;
        for record in records {
            let _ = self.event_bus.publish(record);
        }
        Ok(value)
    }
}

pub struct RequestsApi<'a, S: Store> {
    core: &'a Marketplace<S>,
}

impl<'a, S: Store> RequestsApi<'a, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreateRequestInput,
    ) -> Result<Request, MarketError> {
        self.core.with_events(ctx, |store| {
            validate_create_request(&input)?;
            if store.users().get(&input.owner_id)?.is_none() {
                return Err(MarketError::User(UserError::NotFound));
            }
            // Remote requests carry no location.
            let input = CreateRequestInput {
                location: if input.is_remote {
                    None
                } else {
                    input.location
                },
                ..input
            };
            let request = store.requests().create(input)?;
            Ok((
                request.clone(),
                vec![EventBody::RequestCreated { request }],
            ))
        })
    }

    pub fn get(&self, id: &RequestId) -> Result<Option<Request>, MarketError> {
        self.core.store.requests().get(id).map_err(MarketError::from)
    }

    pub fn list(&self, filter: RequestFilter) -> Result<Vec<Request>, MarketError> {
        self.core
            .store
            .requests()
            .list(filter)
            .map_err(MarketError::from)
    }

    pub fn offers_for(&self, id: &RequestId) -> Result<Vec<Offer>, MarketError> {
        if self.core.store.requests().get(id)?.is_none() {
            return Err(MarketError::Request(RequestError::NotFound));
        }
        self.core
            .store
            .offers()
            .list_for_request(id)
            .map_err(MarketError::from)
    }

    pub fn submit_offer(
        &self,
        ctx: &RequestContext,
        request_id: &RequestId,
        input: SubmitOfferInput,
    ) -> Result<Offer, MarketError> {
        self.core.with_events(ctx, |store| {
            let request = store.requests().get(request_id)?;
            let Some(request) = request else {
                return Err(MarketError::Request(RequestError::NotFound));
            };
            if request.status != RequestStatus::Open {
                return Err(MarketError::Request(RequestError::NotOpen));
            }
            validate_submit_offer(&input, &request.owner_id)?;
            if store.users().get(&input.bidder_id)?.is_none() {
                return Err(MarketError::User(UserError::NotFound));
            }

            let offer = store.offers().create(request_id, input)?;
            let mut updated = request.clone();
            updated.bid_count += 1;
            store.requests().update(&updated, request.version)?;
            Ok((offer.clone(), vec![EventBody::OfferSubmitted { offer }]))
        })
    }

    pub fn accept_offer(
        &self,
        ctx: &RequestContext,
        request_id: &RequestId,
        offer_id: &OfferId,
        acting_user_id: &UserId,
    ) -> Result<Request, MarketError> {
        self.core.with_events(ctx, |store| {
            let request = store.requests().get(request_id)?;
            let Some(request) = request else {
                return Err(MarketError::Request(RequestError::NotFound));
            };
            if &request.owner_id != acting_user_id {
                return Err(MarketError::Request(RequestError::NotOwner));
            }
            let offer = store.offers().get(offer_id)?;
            let Some(offer) = offer else {
                return Err(MarketError::Offer(OfferError::NotFound));
            };
            if offer.request_id != request.id {
                return Err(MarketError::Offer(OfferError::WrongRequest));
            }
            if offer.is_decided() {
                return Err(MarketError::Offer(OfferError::AlreadyDecided));
            }
            if request.status != RequestStatus::Open {
                return Err(MarketError::Request(RequestError::NotOpen));
            }

            let now = Utc::now();
            let accepted = store
                .offers()
                .set_status(offer_id, OfferStatus::Accepted, Some(now))?;
            let mut events = vec![EventBody::OfferAccepted {
                offer: accepted.clone(),
            }];

            for sibling in store.offers().list_for_request(request_id)? {
                if sibling.id == accepted.id || sibling.status != OfferStatus::Pending {
                    continue;
                }
                let rejected =
                    store
                        .offers()
                        .set_status(&sibling.id, OfferStatus::Rejected, Some(now))?;
                events.push(EventBody::OfferDeclined { offer: rejected });
            }

            let mut updated = request.clone();
            updated.status = RequestStatus::InProgress;
            let updated = store.requests().update(&updated, request.version)?;
            events.push(EventBody::RequestStatusChanged {
                request: updated.clone(),
                from: request.status,
                to: RequestStatus::InProgress,
            });

            let thread = store.threads().find(request_id, &accepted.bidder_id)?;
            if thread.is_none() {
                let expires_at = now + Duration::days(THREAD_TTL_DAYS);
                let thread = store.threads().create(
                    request_id,
                    &request.owner_id,
                    &accepted.bidder_id,
                    expires_at,
                )?;
                events.push(EventBody::ThreadOpened { thread });
            }

            Ok((updated, events))
        })
    }

    pub fn decline_offer(
        &self,
        ctx: &RequestContext,
        request_id: &RequestId,
        offer_id: &OfferId,
        acting_user_id: &UserId,
    ) -> Result<Offer, MarketError> {
        self.core.with_events(ctx, |store| {
            let request = store.requests().get(request_id)?;
            let Some(request) = request else {
                return Err(MarketError::Request(RequestError::NotFound));
            };
            if &request.owner_id != acting_user_id {
                return Err(MarketError::Request(RequestError::NotOwner));
            }
            let offer = store.offers().get(offer_id)?;
            let Some(offer) = offer else {
                return Err(MarketError::Offer(OfferError::NotFound));
            };
            if offer.request_id != request.id {
                return Err(MarketError::Offer(OfferError::WrongRequest));
            }
            if offer.is_decided() {
                return Err(MarketError::Offer(OfferError::AlreadyDecided));
            }

            let rejected =
                store
                    .offers()
                    .set_status(offer_id, OfferStatus::Rejected, Some(Utc::now()))?;
            Ok((
                rejected.clone(),
                vec![EventBody::OfferDeclined { offer: rejected }],
            ))
        })
    }

    pub fn complete(
        &self,
        ctx: &RequestContext,
        request_id: &RequestId,
        acting_user_id: &UserId,
    ) -> Result<Request, MarketError> {
        self.core.with_events(ctx, |store| {
            let request = store.requests().get(request_id)?;
            let Some(request) = request else {
                return Err(MarketError::Request(RequestError::NotFound));
            };
            if &request.owner_id != acting_user_id {
                return Err(MarketError::Request(RequestError::NotOwner));
            }
            if request.status != RequestStatus::InProgress {
                return Err(MarketError::Request(RequestError::InvalidTransition {
                    from: request.status,
                    to: RequestStatus::Completed,
                }));
            }

            let mut updated = request.clone();
            updated.status = RequestStatus::Completed;
            let updated = store.requests().update(&updated, request.version)?;
            let mut events = vec![
                EventBody::RequestStatusChanged {
                    request: updated.clone(),
                    from: request.status,
                    to: RequestStatus::Completed,
                },
                EventBody::RequestCompleted {
                    request: updated.clone(),
                },
            ];

            let offers = store.offers().list_for_request(request_id)?;
            let accepted = offers
                .into_iter()
                .find(|offer| offer.status == OfferStatus::Accepted);
            if let Some(offer) = accepted {
                if let Some(bidder) = store.users().get(&offer.bidder_id)? {
                    store.users().set_standing(
                        &bidder.id,
                        apply_karma(bidder.karma, COMPLETION_BIDDER_KARMA),
                        bidder.campus_credits + offer.amount,
                    )?;
                    events.push(EventBody::KarmaAwarded {
                        user_id: bidder.id,
                        delta: COMPLETION_BIDDER_KARMA,
                        reason: "request completed".to_string(),
                    });
                }
                if let Some(seeker) = store.users().get(&request.owner_id)? {
                    store.users().set_standing(
                        &seeker.id,
                        apply_karma(seeker.karma, COMPLETION_SEEKER_KARMA),
                        seeker.campus_credits,
                    )?;
                    events.push(EventBody::KarmaAwarded {
                        user_id: seeker.id,
                        delta: COMPLETION_SEEKER_KARMA,
                        reason: "request completed".to_string(),
                    });
                }
            }

            Ok((updated, events))
        })
    }

    pub fn cancel(
        &self,
        ctx: &RequestContext,
        request_id: &RequestId,
        acting_user_id: &UserId,
    ) -> Result<Request, MarketError> {
        self.core.with_events(ctx, |store| {
            let request = store.requests().get(request_id)?;
            let Some(request) = request else {
                return Err(MarketError::Request(RequestError::NotFound));
            };
            if &request.owner_id != acting_user_id {
                return Err(MarketError::Request(RequestError::NotOwner));
            }
            if request.is_terminal() {
                return Err(MarketError::Request(RequestError::InvalidTransition {
                    from: request.status,
                    to: RequestStatus::Cancelled,
                }));
            }
            validate_request_status_transition(request.status, RequestStatus::Cancelled)?;

            let now = Utc::now();
            let mut events = Vec::new();
            for offer in store.offers().list_for_request(request_id)? {
                if offer.status != OfferStatus::Pending {
                    continue;
                }
                let rejected =
                    store
                        .offers()
                        .set_status(&offer.id, OfferStatus::Rejected, Some(now))?;
                events.push(EventBody::OfferDeclined { offer: rejected });
            }

            store.threads().expire_for_request(request_id, now)?;

            let mut updated = request.clone();
            updated.status = RequestStatus::Cancelled;
            let updated = store.requests().update(&updated, request.version)?;
            events.push(EventBody::RequestStatusChanged {
                request: updated.clone(),
                from: request.status,
                to: RequestStatus::Cancelled,
            });
            events.push(EventBody::RequestCancelled {
                request: updated.clone(),
            });

            Ok((updated, events))
        })
    }
}

pub struct OffersApi<'a, S: Store> {
    core: &'a Marketplace<S>,
}

impl<'a, S: Store> OffersApi<'a, S> {
    pub fn get(&self, id: &OfferId) -> Result<Option<Offer>, MarketError> {
        self.core.store.offers().get(id).map_err(MarketError::from)
    }

    pub fn list(&self, filter: OfferFilter) -> Result<Vec<Offer>, MarketError> {
        self.core
            .store
            .offers()
            .list(filter)
            .map_err(MarketError::from)
    }
}

pub struct UsersApi<'a, S: Store> {
    core: &'a Marketplace<S>,
}

impl<'a, S: Store> UsersApi<'a, S> {
    pub fn register(
        &self,
        ctx: &RequestContext,
        input: RegisterUserInput,
    ) -> Result<User, MarketError> {
        self.core.with_events(ctx, |store| {
            validate_register_user(&input)?;
            let user = store.users().create(input)?;
            Ok((user.clone(), vec![EventBody::UserRegistered { user }]))
        })
    }

    pub fn get(&self, id: &UserId) -> Result<Option<User>, MarketError> {
        self.core.store.users().get(id).map_err(MarketError::from)
    }

    pub fn list(&self, filter: UserFilter) -> Result<Vec<User>, MarketError> {
        self.core
            .store
            .users()
            .list(filter)
            .map_err(MarketError::from)
    }

    pub fn update_profile(
        &self,
        ctx: &RequestContext,
        id: &UserId,
        input: UpdateProfileInput,
        acting_user_id: &UserId,
    ) -> Result<User, MarketError> {
        self.core.with_events(ctx, |store| {
            if id != acting_user_id {
                return Err(MarketError::User(UserError::NotSelf));
            }
            if store.users().get(id)?.is_none() {
                return Err(MarketError::User(UserError::NotFound));
            }
            if let Some(name) = &input.name {
                if name.trim().is_empty() {
                    return Err(MarketError::User(UserError::InvalidInput {
                        message: "name must not be empty".to_string(),
                    }));
                }
            }
            let user = store.users().update_profile(id, input)?;
            Ok((user.clone(), vec![EventBody::ProfileUpdated { user }]))
        })
    }
}

pub struct ThreadsApi<'a, S: Store> {
    core: &'a Marketplace<S>,
}

impl<'a, S: Store> ThreadsApi<'a, S> {
    pub fn get(&self, id: &ThreadId) -> Result<Option<Thread>, MarketError> {
        self.core.store.threads().get(id).map_err(MarketError::from)
    }

    pub fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Thread>, MarketError> {
        self.core
            .store
            .threads()
            .list_for_user(user_id)
            .map_err(MarketError::from)
    }

    pub fn messages(&self, id: &ThreadId) -> Result<Vec<Message>, MarketError> {
        if self.core.store.threads().get(id)?.is_none() {
            return Err(MarketError::Thread(ThreadError::NotFound));
        }
        self.core
            .store
            .threads()
            .messages(id)
            .map_err(MarketError::from)
    }

    pub fn send_message(
        &self,
        ctx: &RequestContext,
        thread_id: &ThreadId,
        input: SendMessageInput,
    ) -> Result<Message, MarketError> {
        self.core.with_events(ctx, |store| {
            let thread = store.threads().get(thread_id)?;
            let Some(thread) = thread else {
                return Err(MarketError::Thread(ThreadError::NotFound));
            };
            if !thread.is_participant(&input.sender_id) {
                return Err(MarketError::Thread(ThreadError::NotParticipant));
            }
            if thread.is_expired(Utc::now()) {
                return Err(MarketError::Thread(ThreadError::Expired));
            }
            if input.body.trim().is_empty() {
                return Err(MarketError::Thread(ThreadError::InvalidInput {
                    message: "message body must not be empty".to_string(),
                }));
            }
            let message = store
                .threads()
                .add_message(thread_id, &input.sender_id, &input.body)?;
            Ok((message.clone(), vec![EventBody::MessageSent { message }]))
        })
    }

    pub fn purge_expired(
        &self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
    ) -> Result<u64, MarketError> {
        self.core.with_events(ctx, |store| {
            let purged = store.threads().purge_expired(now)?;
            let events = if purged > 0 {
                vec![EventBody::ThreadsPurged { purged }]
            } else {
                Vec::new()
            };
            Ok((purged, events))
        })
    }
}

pub struct DropsApi<'a, S: Store> {
    core: &'a Marketplace<S>,
}

impl<'a, S: Store> DropsApi<'a, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreateDropInput,
    ) -> Result<FlashDrop, MarketError> {
        self.core.with_events(ctx, |store| {
            if input.title.trim().is_empty() {
                return Err(MarketError::Drop(DropError::InvalidInput {
                    message: "title must not be empty".to_string(),
                }));
            }
            if input.ends_at <= Utc::now() {
                return Err(MarketError::Drop(DropError::InvalidInput {
                    message: "ends_at must be in the future".to_string(),
                }));
            }
            for request_id in &input.request_ids {
                let request = store.requests().get(request_id)?;
                let Some(request) = request else {
                    return Err(MarketError::Request(RequestError::NotFound));
                };
                if request.status != RequestStatus::Open {
                    return Err(MarketError::Request(RequestError::NotOpen));
                }
            }
            let drop = store.drops().create(input)?;
            Ok((drop.clone(), vec![EventBody::DropCreated { drop }]))
        })
    }

    pub fn get(&self, id: &DropId) -> Result<Option<FlashDrop>, MarketError> {
        self.core.store.drops().get(id).map_err(MarketError::from)
    }

    pub fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<FlashDrop>, MarketError> {
        self.core
            .store
            .drops()
            .list_active(now)
            .map_err(MarketError::from)
    }

    pub fn participant_count(&self, id: &DropId) -> Result<i64, MarketError> {
        if self.core.store.drops().get(id)?.is_none() {
            return Err(MarketError::Drop(DropError::NotFound));
        }
        self.core
            .store
            .drops()
            .participant_count(id)
            .map_err(MarketError::from)
    }
}

pub struct EventsApi<'a, S: Store> {
    core: &'a Marketplace<S>,
}

impl<'a, S: Store> EventsApi<'a, S> {
    pub fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, MarketError> {
        self.core
            .store
            .events()
            .list(after, limit)
            .map_err(MarketError::from)
    }
}

fn build_event_record(ctx: &RequestContext, body: EventBody) -> Result<EventRecord, MarketError> {
    let value = serde_json::to_value(body).map_err(|err| MarketError::Internal {
        message: err.to_string(),
    })?;
    Ok(EventRecord {
        id: String::new(),
        seq: 0,
        at: Utc::now(),
        correlation_id: ctx.correlation_id.clone(),
        source: ctx.source,
        body: value,
    })
}
