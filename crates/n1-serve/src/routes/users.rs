use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{AppState, build_marketplace};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use n1_core::error::UserError;
use n1_core::types::{
    RegisterUserInput, UpdateProfileInput, User, UserFilter, UserId,
};
use n1_events::types::EventSource;
use utoipa::ToSchema;

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct UpdateProfileBody {
    pub user_id: UserId,
    pub name: Option<String>,
    pub skills: Option<Vec<String>>,
    pub major: Option<String>,
    pub graduation_year: Option<i32>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(register_user).get(list_users))
        .route("/users/{id}", get(get_user).patch(update_profile))
        .with_state(state)
}

fn parse_user_id(id: &str, correlation_id: Option<String>) -> Result<UserId, Response> {
    UserId::new(id.to_string()).map_err(|err| {
        map_error(
            &n1_core::MarketError::User(UserError::InvalidInput {
                message: err.to_string(),
            }),
            correlation_id,
        )
        .into_response()
    })
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserInput,
    responses((status = 200, body = User))
)]
pub(crate) async fn register_user(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<RegisterUserInput>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = n1_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match marketplace.users().register(&ctx, input) {
        Ok(user) => Json(user).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilter),
    responses((status = 200, body = Vec<User>))
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match marketplace.users().list(filter) {
        Ok(users) => Json(users).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses((status = 200, body = User), (status = 404))
)]
pub(crate) async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let user_id = match parse_user_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match marketplace.users().get(&user_id) {
        Ok(Some(user)) => Json(user).into_response(),
        Ok(None) => {
            map_error(&n1_core::MarketError::User(UserError::NotFound), None).into_response()
        }
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateProfileBody,
    responses((status = 200, body = User))
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProfileBody>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let user_id = match parse_user_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let input = UpdateProfileInput {
        name: body.name,
        skills: body.skills,
        major: body.major,
        graduation_year: body.graduation_year,
    };
    let ctx = n1_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match marketplace
        .users()
        .update_profile(&ctx, &user_id, input, &body.user_id)
    {
        Ok(user) => Json(user).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
