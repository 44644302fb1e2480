use chrono::{Duration, Utc};
use n1_core::error::{DropError, ThreadError, UserError};
use n1_core::types::{
    Category, CreateDropInput, CreateRequestInput, Offer, RegisterUserInput, Request,
    SendMessageInput, SubmitOfferInput, UpdateProfileInput, User,
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
                skills: vec!["tutoring".to_string()],
                major: None,
                graduation_year: None,
            },
        )
        .unwrap()
}

fn post_request(market: &Marketplace<DbStore>, owner: &User) -> Request {
    market
        .requests()
        .create(
            &ctx(),
            CreateRequestInput {
                owner_id: owner.id.clone(),
                title: "Move a couch".to_string(),
                description: "Third floor, no elevator".to_string(),
                category: Category::Moving,
                budget: 30,
                location: Some("Oak Hall".to_string()),
                is_remote: false,
                deadline: Utc::now() + Duration::days(2),
                tags: Vec::new(),
            },
        )
        .unwrap()
}

fn bid(market: &Marketplace<DbStore>, request: &Request, bidder: &User) -> Offer {
    market
        .requests()
        .submit_offer(
            &ctx(),
            &request.id,
            SubmitOfferInput {
                bidder_id: bidder.id.clone(),
                amount: 30,
                message: "I have a truck".to_string(),
            },
        )
        .unwrap()
}

#[test]
fn registration_rejects_bad_email() {
    let market = marketplace();
    let result = market.users().register(
        &ctx(),
        RegisterUserInput {
            name: "maya".to_string(),
            email: "not-an-email".to_string(),
            skills: Vec::new(),
            major: None,
            graduation_year: None,
        },
    );
    assert!(matches!(
        result,
        Err(MarketError::User(UserError::InvalidInput { .. }))
    ));
}

#[test]
fn profile_updates_require_the_same_user() {
    let market = marketplace();
    let maya = register(&market, "maya");
    let dev = register(&market, "dev");

    let result = market.users().update_profile(
        &ctx(),
        &maya.id,
        UpdateProfileInput {
            name: Some("not maya".to_string()),
            ..UpdateProfileInput::default()
        },
        &dev.id,
    );
    assert!(matches!(result, Err(MarketError::User(UserError::NotSelf))));

    let updated = market
        .users()
        .update_profile(
            &ctx(),
            &maya.id,
            UpdateProfileInput {
                major: Some("Physics".to_string()),
                graduation_year: Some(2027),
                ..UpdateProfileInput::default()
            },
            &maya.id,
        )
        .unwrap();
    assert_eq!(updated.major.as_deref(), Some("Physics"));
    assert_eq!(updated.graduation_year, Some(2027));
}

#[test]
fn accepting_opens_a_thread_for_both_parties() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner);
    let offer = bid(&market, &request, &bidder);

    market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer.id, &owner.id)
        .unwrap();

    let threads = market.threads().list_for_user(&owner.id).unwrap();
    assert_eq!(threads.len(), 1);
    let thread = &threads[0];
    assert_eq!(thread.request_id, request.id);
    assert_eq!(thread.seeker_id, owner.id);
    assert_eq!(thread.bidder_id, bidder.id);

    let sent = market
        .threads()
        .send_message(
            &ctx(),
            &thread.id,
            SendMessageInput {
                sender_id: bidder.id.clone(),
                body: "When works for you?".to_string(),
            },
        )
        .unwrap();
    assert_eq!(sent.sender_id, bidder.id);

    let messages = market.threads().messages(&thread.id).unwrap();
    assert_eq!(messages.len(), 1);
}

#[test]
fn outsiders_cannot_post_into_a_thread() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let outsider = register(&market, "sam");
    let request = post_request(&market, &owner);
    let offer = bid(&market, &request, &bidder);

    market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer.id, &owner.id)
        .unwrap();
    let thread = market.threads().list_for_user(&owner.id).unwrap().remove(0);

    let result = market.threads().send_message(
        &ctx(),
        &thread.id,
        SendMessageInput {
            sender_id: outsider.id.clone(),
            body: "let me in".to_string(),
        },
    );
    assert!(matches!(
        result,
        Err(MarketError::Thread(ThreadError::NotParticipant))
    ));
}

#[test]
fn cancelling_expires_threads_and_purge_removes_them() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner);
    let offer = bid(&market, &request, &bidder);

    market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer.id, &owner.id)
        .unwrap();
    let thread = market.threads().list_for_user(&owner.id).unwrap().remove(0);

    market
        .requests()
        .cancel(&ctx(), &request.id, &owner.id)
        .unwrap();

    let result = market.threads().send_message(
        &ctx(),
        &thread.id,
        SendMessageInput {
            sender_id: owner.id.clone(),
            body: "never mind".to_string(),
        },
    );
    assert!(matches!(
        result,
        Err(MarketError::Thread(ThreadError::Expired))
    ));

    let purged = market
        .threads()
        .purge_expired(&ctx(), Utc::now() + Duration::seconds(1))
        .unwrap();
    assert_eq!(purged, 1);
    assert!(market.threads().get(&thread.id).unwrap().is_none());
}

#[test]
fn drops_group_open_requests() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let other = register(&market, "sam");
    let request_a = post_request(&market, &owner);
    let request_b = post_request(&market, &owner);
    bid(&market, &request_a, &bidder);
    bid(&market, &request_b, &bidder);
    bid(&market, &request_b, &other);

    let drop = market
        .drops()
        .create(
            &ctx(),
            CreateDropInput {
                title: "Finals week flash".to_string(),
                ends_at: Utc::now() + Duration::hours(6),
                request_ids: vec![request_a.id.clone(), request_b.id.clone()],
            },
        )
        .unwrap();
    assert_eq!(drop.request_ids.len(), 2);

    let active = market.drops().list_active(Utc::now()).unwrap();
    assert_eq!(active.len(), 1);
    assert!(market.drops().list_active(Utc::now() + Duration::days(1)).unwrap().is_empty());

    // Two distinct bidders across the grouped requests.
    assert_eq!(market.drops().participant_count(&drop.id).unwrap(), 2);
}

#[test]
fn drops_refuse_closed_requests() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let request = post_request(&market, &owner);
    market
        .requests()
        .cancel(&ctx(), &request.id, &owner.id)
        .unwrap();

    let result = market.drops().create(
        &ctx(),
        CreateDropInput {
            title: "Stale drop".to_string(),
            ends_at: Utc::now() + Duration::hours(1),
            request_ids: vec![request.id.clone()],
        },
    );
    assert!(result.is_err());

    let result = market.drops().create(
        &ctx(),
        CreateDropInput {
            title: String::new(),
            ends_at: Utc::now() + Duration::hours(1),
            request_ids: Vec::new(),
        },
    );
    assert!(matches!(
        result,
        Err(MarketError::Drop(DropError::InvalidInput { .. }))
    ));
}

#[test]
fn every_mutation_lands_in_the_event_log() {
    let market = marketplace();
    let owner = register(&market, "maya");
    let bidder = register(&market, "dev");
    let request = post_request(&market, &owner);
    let offer = bid(&market, &request, &bidder);
    market
        .requests()
        .accept_offer(&ctx(), &request.id, &offer.id, &owner.id)
        .unwrap();
    market
        .requests()
        .complete(&ctx(), &request.id, &owner.id)
        .unwrap();

    let events = market.events().list(None, None).unwrap();
    assert!(events.len() >= 6);
    for pair in events.windows(2) {
        assert!(pair[0].seq < pair[1].seq);
    }
    for event in &events {
        assert!(event.id.starts_with("evt_"));
        assert_eq!(event.source, EventSource::Cli);
    }

    let cutoff = events[2].seq;
    let tail = market.events().list(Some(cutoff), None).unwrap();
    assert!(tail.iter().all(|event| event.seq > cutoff));
    assert_eq!(tail.len(), events.len() - 3);

    let limited = market.events().list(None, Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
}
