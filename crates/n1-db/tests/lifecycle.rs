use chrono::{Duration, Utc};
use n1_core::error::{OfferError, RequestError};
use n1_core::requests::RequestRepository;
use n1_core::store::Store;
use n1_core::types::{
    Category, CreateRequestInput, Offer, OfferStatus, RegisterUserInput, Request, RequestStatus,
    SubmitOfferInput, User,
};
use n1_core::{MarketError, Marketplace, RequestContext};
use n1_db::schema::with_test_db;
use n1_db::store::DbStore;
use n1_events::bus::EventBus;
use n1_events::types::EventSource;

fn marketplace() -> Marketplace<DbStore> {
    let conn = with_test_db().unwrap();
    Marketplace::new(DbStore::new(conn), EventBus::new(64))
}

fn ctx() -> RequestContext {
    RequestContext::new(EventSource::Cli, None)
}

fn register(market: &Marketplace<DbStore>, name: &str) -> User {
    market
        .users()
        .register(
            &ctx(),
            RegisterUserInput {
                name: name.to_string(),
                email: format!("{name}@campus.edu"),
                skills: Vec::new(),
                major: None,
                graduation_year: None,
            },
        )
        .unwrap()
}

fn post_request(market: &Marketplace<DbStore>, owner: &User, budget: i64) -> Request {
    market
        .requests()
        .create(
            &ctx(),
            CreateRequestInput {
                owner_id: owner.id.clone(),
                title: "Calc II tutoring".to_string(),
                description: "Two sessions before the final".to_string(),
                category: Category::Tutoring,
                budget,
                location: Some("Library basement".to_string()),
                is_remote: false,
                deadline: Utc::now() + Duration::days(3),
                tags: vec!["math".to_string()],
            },
        )
        .unwrap()
}

fn bid(market: &Marketplace<DbStore>, request: &Request, bidder: &User, amount: i64) -> Offer {
    market
        .requests()
        .submit_offer(
            &ctx(),
            &request.id,
            SubmitOfferInput {
                bidder_id: bidder.id.clone(),
                amount,
                message: "I can help".to_string(),
            },
        )
        .unwrap()
}

#[test]
fn new_request_starts_open_with_no_bids() {
    let market = marketplace();
    let owner = register(&market, "maya");

    let request = post_request(&market, &owner, 25);
    assert_eq!(request.status, RequestStatus::Open);
    assert_eq!(request.bid_count, 0);
    assert_eq!(request.version, 1);
    assert_eq!(request.location.as_deref(), Some("Library basement"));
}

#[test]
fn remote_request_drops_its_location() {
    let market = marketplace();
    let owner = register(&market, "maya");

    let request = market
        .requests()
        .create(
            &ctx(),
            CreateRequestInput {
                owner_id: owner.id.clone(),
                title: "Resume review".to_string(),
                description: "One page, design track".to_string(),
                category: Category::Design,
                budget: 10,
                location: Some("anywhere".to_string()),
                is_remote: true,
                deadline: Utc::now() + Duration::days(1),
                tags: Vec::new(),
            },
        )
        .unwrap();
    assert!(request.location.is_none());
}

#[test]
fn submitting_an_offer_increments_bid_count() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner, 25);

    let offer = bid(&market, &request, &bidder, 20);
    assert_eq!(offer.status, OfferStatus::Pending);
    assert!(offer.decided_at.is_none());

    let request = market.requests().get(&request.id).unwrap().unwrap();
    assert_eq!(request.bid_count, 1);
    assert_eq!(request.version, 2);
}

#[test]
fn owner_cannot_bid_on_own_request() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let request = post_request(&market, &owner, 25);

    let result = market.requests().submit_offer(
        &ctx(),
        &request.id,
        SubmitOfferInput {
            bidder_id: owner.id.clone(),
            amount: 5,
            message: "free money".to_string(),
        },
    );
    assert!(matches!(
        result,
        Err(MarketError::Offer(OfferError::InvalidInput { .. }))
    ));
}

#[test]
fn offers_above_budget_are_allowed() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner, 25);

    let offer = bid(&market, &request, &bidder, 40);
    assert_eq!(offer.amount, 40);
    assert_eq!(offer.status, OfferStatus::Pending);
}

#[test]
fn accepting_an_offer_rejects_pending_siblings() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let first = register(&market, "dev");
    let second = register(&market, "sam");
    let request = post_request(&market, &owner, 25);
    let offer_one = bid(&market, &request, &first, 20);
    let offer_two = bid(&market, &request, &second, 25);

    let updated = market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer_two.id, &owner.id)
        .unwrap();
    assert_eq!(updated.status, RequestStatus::InProgress);
    assert_eq!(updated.bid_count, 2);

    let offers = market.requests().offers_for(&request.id).unwrap();
    let accepted = offers.iter().find(|o| o.id == offer_two.id).unwrap();
    let rejected = offers.iter().find(|o| o.id == offer_one.id).unwrap();
    assert_eq!(accepted.status, OfferStatus::Accepted);
    assert!(accepted.decided_at.is_some());
    assert_eq!(rejected.status, OfferStatus::Rejected);
    assert!(rejected.decided_at.is_some());
}

#[test]
fn only_the_owner_can_accept() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner, 25);
    let offer = bid(&market, &request, &bidder, 20);

    let result = market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer.id, &bidder.id);
    assert!(matches!(
        result,
        Err(MarketError::Request(RequestError::NotOwner))
    ));
}

#[test]
fn accepting_a_decided_offer_fails() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let first = register(&market, "dev");
    let second = register(&market, "sam");
    let request = post_request(&market, &owner, 25);
    let offer_one = bid(&market, &request, &first, 20);
    let offer_two = bid(&market, &request, &second, 25);

    market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer_one.id, &owner.id)
        .unwrap();

    // The sibling was auto-rejected by the accept.
    let result = market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer_two.id, &owner.id);
    assert!(matches!(
        result,
        Err(MarketError::Offer(OfferError::AlreadyDecided))
    ));
}

#[test]
fn declining_keeps_the_request_open() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let first = register(&market, "dev");
    let second = register(&market, "sam");
    let request = post_request(&market, &owner, 25);
    let offer_one = bid(&market, &request, &first, 20);
    let offer_two = bid(&market, &request, &second, 25);

    let declined = market
        .requests()
        .decline_offer(&ctx(), &request.id, &offer_one.id, &owner.id)
        .unwrap();
    assert_eq!(declined.status, OfferStatus::Rejected);

    let request = market.requests().get(&request.id).unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::Open);
    assert_eq!(request.bid_count, 2);

    // The other offer is still acceptable.
    let updated = market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer_two.id, &owner.id)
        .unwrap();
    assert_eq!(updated.status, RequestStatus::InProgress);
}

#[test]
fn declining_a_decided_offer_fails() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner, 25);
    let offer = bid(&market, &request, &bidder, 20);

    market
        .requests()
        .decline_offer(&ctx(), &request.id, &offer.id, &owner.id)
        .unwrap();
    let result = market
        .requests()
        .decline_offer(&ctx(), &request.id, &offer.id, &owner.id);
    assert!(matches!(
        result,
        Err(MarketError::Offer(OfferError::AlreadyDecided))
    ));
}

#[test]
fn offers_against_a_closed_request_are_refused() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner, 25);

    market
        .requests()
        .cancel(&ctx(), &request.id, &owner.id)
        .unwrap();

    let result = market.requests().submit_offer(
        &ctx(),
        &request.id,
        SubmitOfferInput {
            bidder_id: bidder.id.clone(),
            amount: 20,
            message: "too late?".to_string(),
        },
    );
    assert!(matches!(
        result,
        Err(MarketError::Request(RequestError::NotOpen))
    ));

    let request = market.requests().get(&request.id).unwrap().unwrap();
    assert_eq!(request.bid_count, 0);
}

#[test]
fn completing_requires_in_progress() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let request = post_request(&market, &owner, 25);

    let result = market.requests().complete(&ctx(), &request.id, &owner.id);
    assert!(matches!(
        result,
        Err(MarketError::Request(RequestError::InvalidTransition {
            from: RequestStatus::Open,
            to: RequestStatus::Completed,
        }))
    ));
}

#[test]
fn completing_awards_karma_and_credits() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner, 25);
    let offer = bid(&market, &request, &bidder, 20);

    market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer.id, &owner.id)
        .unwrap();
    let completed = market
        .requests()
        .complete(&ctx(), &request.id, &owner.id)
        .unwrap();
    assert_eq!(completed.status, RequestStatus::Completed);

    let bidder = market.users().get(&bidder.id).unwrap().unwrap();
    assert_eq!(bidder.karma, 5);
    assert_eq!(bidder.campus_credits, 20);
    let owner = market.users().get(&owner.id).unwrap().unwrap();
    assert_eq!(owner.karma, 1);
    assert_eq!(owner.campus_credits, 0);
}

#[test]
fn cancelling_rejects_pending_offers() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let first = register(&market, "dev");
    let second = register(&market, "sam");
    let request = post_request(&market, &owner, 25);
    bid(&market, &request, &first, 20);
    bid(&market, &request, &second, 25);

    let cancelled = market
        .requests()
        .cancel(&ctx(), &request.id, &owner.id)
        .unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);

    for offer in market.requests().offers_for(&request.id).unwrap() {
        assert_eq!(offer.status, OfferStatus::Rejected);
    }
}

#[test]
fn cancelling_in_progress_keeps_the_accepted_offer() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner, 25);
    let offer = bid(&market, &request, &bidder, 20);

    market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer.id, &owner.id)
        .unwrap();
    let cancelled = market
        .requests()
        .cancel(&ctx(), &request.id, &owner.id)
        .unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);

    let offer = market.offers().get(&offer.id).unwrap().unwrap();
    assert_eq!(offer.status, OfferStatus::Accepted);
}

#[test]
fn terminal_requests_cannot_be_cancelled_again() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let request = post_request(&market, &owner, 25);

    market
        .requests()
        .cancel(&ctx(), &request.id, &owner.id)
        .unwrap();
    let result = market.requests().cancel(&ctx(), &request.id, &owner.id);
    assert!(matches!(
        result,
        Err(MarketError::Request(RequestError::InvalidTransition { .. }))
    ));
}

#[test]
fn stale_version_updates_conflict() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let request = post_request(&market, &owner, 25);

    let store = market.store();
    let mut first = request.clone();
    first.title = "Calc II tutoring, urgent".to_string();
    store.requests().update(&first, request.version).unwrap();

    let mut second = request.clone();
    second.title = "different edit".to_string();
    let result = store.requests().update(&second, request.version);
    assert!(matches!(result, Err(RequestError::Conflict { .. })));
}

#[test]
fn accepting_an_offer_from_another_request_fails() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request_a = post_request(&market, &owner, 25);
    let request_b = post_request(&market, &owner, 30);
    let offer_on_a = bid(&market, &request_a, &bidder, 20);

    let result = market
        .requests()
        .accept_offer(&ctx(), &request_b.id, &offer_on_a.id, &owner.id);
    assert!(matches!(
        result,
        Err(MarketError::Offer(OfferError::WrongRequest))
    ));
}

#[test]
fn failed_operations_leave_no_partial_state() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner, 25);
    let offer = bid(&market, &request, &bidder, 20);

    // Non-owner accept fails; nothing about the request or offer moves.
    let _ = market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer.id, &bidder.id);

    let request = market.requests().get(&request.id).unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::Open);
    let offer = market.offers().get(&offer.id).unwrap().unwrap();
    assert_eq!(offer.status, OfferStatus::Pending);
}
