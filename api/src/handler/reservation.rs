use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;

use kernel::model::id::ReservationId;
use registry::AppRegistry;
use shared::error::AppResult;

use crate::model::reservation::{
    CreateReservationRequest, ReservationListQuery, ReservationResponse,
    UpdateReservationRequest, UpdateReservationRequestWithId,
};

pub async fn register_reservation(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    req.validate(&())?;

    registry
        .reservation_repository()
        .create(req.into())
        .await
        .map(|reservation| (StatusCode::CREATED, Json(reservation.into())))
}

pub async fn show_reservation_list(
    Query(query): Query<ReservationListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<ReservationResponse>>> {
    query.validate(&())?;

    registry
        .reservation_repository()
        .find_all(query.into())
        .await
        .map(|reservations| {
            Json(
                reservations
                    .into_iter()
                    .map(ReservationResponse::from)
                    .collect(),
            )
        })
}

pub async fn show_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationResponse>> {
    registry
        .reservation_repository()
        .find_by_id(reservation_id)
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn update_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateReservationRequest>,
) -> AppResult<Json<ReservationResponse>> {
    req.validate(&())?;

    let update = UpdateReservationRequestWithId::new(reservation_id, req);
    registry
        .reservation_repository()
        .update(update.into())
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn delete_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .reservation_repository()
        .delete(reservation_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
