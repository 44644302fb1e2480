use utoipa::OpenApi;

use crate::routes::drops::DropParticipants;
use crate::routes::events::EventsQuery;
use crate::routes::requests::ActorInput;
use crate::routes::threads::ThreadListQuery;
use crate::routes::users::UpdateProfileBody;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use n1_core::types::enums::{Category, OfferStatus, RequestStatus};
use n1_core::types::ids::{DropId, MessageId, OfferId, RequestId, ThreadId, UserId};
use n1_core::types::io::{
    CreateDropInput, CreateRequestInput, OfferFilter, RegisterUserInput, RequestFilter,
    SendMessageInput, SubmitOfferInput, UpdateProfileInput, UserFilter,
};
use n1_core::types::{FlashDrop, Message, Offer, Request, Thread, User};
use n1_events::types::{EventRecord, EventSource};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::requests::create_request,
        crate::routes::requests::list_requests,
        crate::routes::requests::get_request,
        crate::routes::requests::list_request_offers,
        crate::routes::requests::submit_offer,
        crate::routes::requests::accept_offer,
        crate::routes::requests::decline_offer,
        crate::routes::requests::complete_request,
        crate::routes::requests::cancel_request,
        crate::routes::offers::list_offers,
        crate::routes::offers::get_offer,
        crate::routes::users::register_user,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::update_profile,
        crate::routes::threads::list_threads,
        crate::routes::threads::get_thread,
        crate::routes::threads::list_messages,
        crate::routes::threads::send_message,
        crate::routes::drops::create_drop,
        crate::routes::drops::list_drops,
        crate::routes::drops::get_drop,
        crate::routes::drops::participants,
        crate::routes::events::list_events,
        crate::routes::events::subscribe,
        crate::routes::events::stream
    ),
    components(schemas(
        Request,
        Offer,
        User,
        Thread,
        Message,
        FlashDrop,
        CreateRequestInput,
        SubmitOfferInput,
        RequestFilter,
        OfferFilter,
        RegisterUserInput,
        UpdateProfileInput,
        UserFilter,
        SendMessageInput,
        CreateDropInput,
        ActorInput,
        UpdateProfileBody,
        ThreadListQuery,
        DropParticipants,
        EventsQuery,
        RequestId,
        OfferId,
        UserId,
        ThreadId,
        MessageId,
        DropId,
        RequestStatus,
        OfferStatus,
        Category,
        EventRecord,
        EventSource
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn ensure_initialized() {
    let _ = ApiDoc::openapi();
}

pub fn router() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn swagger_ui() -> impl IntoResponse {
    let html = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Need1 API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      window.ui = SwaggerUIBundle({ url: '/api/openapi.json', dom_id: '#swagger-ui' });
    </script>
  </body>
</html>
"#;
    (axum::http::StatusCode::OK, html)
}
