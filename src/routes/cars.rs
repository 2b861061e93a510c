//! Car route handlers
//!
//! Each handler validates its input first and only then checks out a store
//! session. The session is dropped when the handler returns, which releases
//! the pooled connection on success and error paths alike.

use crate::error::{not_found_error, validation_error, ApiResult, AppError};
use crate::models::{Acknowledgment, Car, CarFields, CarRequest, MessageResponse};
use crate::state::SharedState;
use axum::{
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::header,
    Json,
};
use tracing::{debug, info};

/// Car request body.
///
/// A body that is empty or not sent as JSON reads as `{}`, so it fails field
/// validation instead of being rejected as malformed.
pub struct CarBody(pub CarRequest);

fn is_json_content(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let mime = value.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

impl<S> FromRequest<S> for CarBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = is_json_content(&req);
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(CarBody(CarRequest::default()));
        }

        let Json(payload) = Json::<CarRequest>::from_bytes(&bytes)?;
        Ok(CarBody(payload))
    }
}

/// Path ids that do not parse as an integer can never match a row
fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn validated(payload: CarRequest) -> ApiResult<CarFields> {
    payload.into_fields().map_err(validation_error)
}

/// List all live cars
pub async fn list_cars(State(state): State<SharedState>) -> ApiResult<Json<Vec<Car>>> {
    let session = state.store.acquire().await.map_err(AppError::FetchFailed)?;
    let cars = session.list_live().await.map_err(AppError::FetchFailed)?;

    debug!("Listed {} cars", cars.len());
    Ok(Json(cars))
}

/// Get one live car, returned as a single-element array
pub async fn get_car(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Car>>> {
    let missing = || not_found_error(format!("No car exists with id {}", id));
    let car_id = parse_id(&id).ok_or_else(missing)?;

    let session = state.store.acquire().await?;
    let car = session.find_live(car_id).await?.ok_or_else(missing)?;

    Ok(Json(vec![car]))
}

/// Create a car
pub async fn create_car(
    State(state): State<SharedState>,
    CarBody(payload): CarBody,
) -> ApiResult<Json<Acknowledgment>> {
    let fields = validated(payload)?;

    let session = state.store.acquire().await?;
    session.insert(&fields).await?;

    info!("Created car {} {} ({})", fields.make, fields.model, fields.year);
    Ok(Json(Acknowledgment::new("Car successfully created")))
}

/// Update make, model and year of a live car
pub async fn update_car(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    CarBody(payload): CarBody,
) -> ApiResult<Json<MessageResponse>> {
    let fields = validated(payload)?;
    let missing = || not_found_error(format!("No car found with id {}", id));
    let car_id = parse_id(&id).ok_or_else(missing)?;

    let session = state.store.acquire().await?;
    if !session.update_live(car_id, &fields).await? {
        return Err(missing());
    }

    info!("Updated car {}", car_id);
    Ok(Json(MessageResponse::new(format!(
        "Car {} updated successfully.",
        id
    ))))
}

/// Soft-delete a live car
pub async fn delete_car(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<String>> {
    let missing = || not_found_error(format!("No car found with id {}", id));
    let car_id = parse_id(&id).ok_or_else(missing)?;

    let session = state.store.acquire().await?;
    if !session.soft_delete(car_id).await? {
        return Err(missing());
    }

    info!("Soft-deleted car {}", car_id);
    Ok(Json(format!("Car {} deleted successfully.", id)))
}
