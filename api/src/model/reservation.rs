use chrono::{DateTime, NaiveDate, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::ReservationId,
    reservation::{
        event::{CreateReservation, UpdateReservation},
        Program, Reservation, ReservationStatus, Slot,
    },
};
use kernel::repository::reservation::ReservationFilter;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    // 日付の実在チェックはスロット表の解決時に行う
    #[garde(skip)]
    pub date: String,
    #[garde(skip)]
    pub program: Program,
    #[garde(skip)]
    pub slot: Slot,
    #[garde(inner(length(max = 255)))]
    pub room: Option<String>,
    #[garde(inner(length(max = 255)))]
    pub name: Option<String>,
    #[garde(inner(length(max = 255)))]
    pub last_name: Option<String>,
    #[garde(inner(length(max = 255)))]
    pub first_name: Option<String>,
    #[garde(inner(email))]
    pub email: Option<String>,
    #[garde(inner(length(max = 32)))]
    pub phone: Option<String>,
    #[garde(inner(length(max = 32)))]
    pub notebook_type: Option<String>,
    #[garde(skip)]
    pub has_certificate: Option<bool>,
    #[garde(inner(length(max = 2000)))]
    pub note: Option<String>,
    #[garde(skip)]
    pub status: Option<ReservationStatus>,
}

impl From<CreateReservationRequest> for CreateReservation {
    fn from(value: CreateReservationRequest) -> Self {
        let CreateReservationRequest {
            date,
            program,
            slot,
            room,
            name,
            last_name,
            first_name,
            email,
            phone,
            notebook_type,
            has_certificate,
            note,
            status,
        } = value;
        CreateReservation::new(
            date,
            program,
            slot,
            room,
            name,
            last_name,
            first_name,
            email,
            phone,
            notebook_type,
            // 未指定の場合の既定値
            has_certificate.unwrap_or(false),
            note,
            status.unwrap_or(ReservationStatus::Booked),
        )
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReservationRequest {
    #[garde(skip)]
    pub date: Option<String>,
    #[garde(skip)]
    pub program: Option<Program>,
    #[garde(skip)]
    pub slot: Option<Slot>,
    #[garde(inner(length(max = 255)))]
    pub room: Option<String>,
    #[garde(inner(length(max = 255)))]
    pub name: Option<String>,
    #[garde(inner(length(max = 255)))]
    pub last_name: Option<String>,
    #[garde(inner(length(max = 255)))]
    pub first_name: Option<String>,
    #[garde(inner(email))]
    pub email: Option<String>,
    #[garde(inner(length(max = 32)))]
    pub phone: Option<String>,
    #[garde(inner(length(max = 32)))]
    pub notebook_type: Option<String>,
    #[garde(skip)]
    pub has_certificate: Option<bool>,
    #[garde(inner(length(max = 2000)))]
    pub note: Option<String>,
    #[garde(skip)]
    pub status: Option<ReservationStatus>,
}

#[derive(Debug, new)]
pub struct UpdateReservationRequestWithId {
    pub reservation_id: ReservationId,
    pub request: UpdateReservationRequest,
}

impl From<UpdateReservationRequestWithId> for UpdateReservation {
    fn from(value: UpdateReservationRequestWithId) -> Self {
        let UpdateReservationRequestWithId {
            reservation_id,
            request,
        } = value;
        UpdateReservation::new(
            reservation_id,
            request.date,
            request.program,
            request.slot,
            request.room,
            request.name,
            request.last_name,
            request.first_name,
            request.email,
            request.phone,
            request.notebook_type,
            request.has_certificate,
            request.note,
            request.status,
        )
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReservationListQuery {
    #[garde(skip)]
    pub date: Option<NaiveDate>,
    #[garde(skip)]
    pub program: Option<Program>,
    #[garde(skip)]
    pub slot: Option<Slot>,
    #[garde(inner(length(max = 255)))]
    pub room: Option<String>,
}

impl From<ReservationListQuery> for ReservationFilter {
    fn from(value: ReservationListQuery) -> Self {
        let ReservationListQuery {
            date,
            program,
            slot,
            room,
        } = value;
        ReservationFilter {
            date,
            program,
            slot,
            room,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: ReservationId,
    pub date: NaiveDate,
    pub program: Program,
    pub slot: Slot,
    pub room: Option<String>,
    pub name: String,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notebook_type: Option<String>,
    pub has_certificate: bool,
    pub note: Option<String>,
    pub status: ReservationStatus,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            id,
            date,
            program,
            slot,
            room,
            name,
            last_name,
            first_name,
            email,
            phone,
            notebook_type,
            has_certificate,
            note,
            status,
            start_at,
            end_at,
            created_at,
            updated_at,
        } = value;
        Self {
            id,
            date,
            program,
            slot,
            room,
            name,
            last_name,
            first_name,
            email,
            phone,
            notebook_type,
            has_certificate,
            note,
            status,
            start_at,
            end_at,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_bad_email() {
        let req: CreateReservationRequest = serde_json::from_value(serde_json::json!({
            "date": "2025-09-11",
            "program": "experience",
            "slot": "am",
            "email": "not-an-email"
        }))
        .unwrap();
        assert!(req.validate(&()).is_err());
    }

    #[test]
    fn create_request_accepts_minimal_body() {
        let req: CreateReservationRequest = serde_json::from_value(serde_json::json!({
            "date": "2025-09-11",
            "program": "tour",
            "slot": "pm"
        }))
        .unwrap();
        assert!(req.validate(&()).is_ok());

        let event: CreateReservation = req.into();
        assert_eq!(event.status, ReservationStatus::Booked);
        assert!(!event.has_certificate);
    }

    #[test]
    fn create_request_rejects_unknown_enum_values() {
        let result = serde_json::from_value::<CreateReservationRequest>(serde_json::json!({
            "date": "2025-09-11",
            "program": "workshop",
            "slot": "am"
        }));
        assert!(result.is_err());

        let result = serde_json::from_value::<CreateReservationRequest>(serde_json::json!({
            "date": "2025-09-11",
            "program": "tour",
            "slot": "night"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn create_request_rejects_overlong_fields() {
        let req: CreateReservationRequest = serde_json::from_value(serde_json::json!({
            "date": "2025-09-11",
            "program": "experience",
            "slot": "am",
            "phone": "0".repeat(64)
        }))
        .unwrap();
        assert!(req.validate(&()).is_err());
    }

    #[test]
    fn status_only_patch_keeps_window_untouched() {
        let req: UpdateReservationRequest =
            serde_json::from_value(serde_json::json!({ "status": "cancelled" })).unwrap();
        assert!(req.validate(&()).is_ok());

        let event: UpdateReservation =
            UpdateReservationRequestWithId::new(ReservationId::new(1), req).into();
        assert!(!event.moves_window());
        assert_eq!(event.status, Some(ReservationStatus::Cancelled));
    }

    #[test]
    fn list_query_maps_to_filter() {
        let query: ReservationListQuery = serde_json::from_value(serde_json::json!({
            "date": "2025-09-11",
            "program": "tour"
        }))
        .unwrap();
        let filter: ReservationFilter = query.into();
        assert_eq!(
            filter.date,
            Some(NaiveDate::from_ymd_opt(2025, 9, 11).unwrap())
        );
        assert_eq!(filter.program, Some(Program::Tour));
        assert!(filter.slot.is_none());
        assert!(filter.room.is_none());
    }
}
