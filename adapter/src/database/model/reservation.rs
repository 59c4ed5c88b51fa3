use kernel::model::{id::ReservationId, reservation::Reservation};
use shared::error::AppError;
use sqlx::types::chrono::{DateTime, NaiveDate, Utc};

/// reservations テーブルの行。program / slot / status は TEXT で持ち、
/// ドメイン型への変換時に検証する
#[derive(Debug, sqlx::FromRow)]
pub struct ReservationRow {
    pub id: i64,
    pub date: NaiveDate,
    pub program: String,
    pub slot: String,
    pub room: Option<String>,
    pub name: String,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notebook_type: Option<String>,
    pub has_certificate: bool,
    pub note: Option<String>,
    pub status: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = AppError;

    fn try_from(value: ReservationRow) -> Result<Self, Self::Error> {
        let ReservationRow {
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
        Ok(Reservation {
            id: ReservationId::new(id),
            date,
            program: program.parse()?,
            slot: slot.parse()?,
            room,
            name,
            last_name,
            first_name,
            email,
            phone,
            notebook_type,
            has_certificate,
            note,
            status: status.parse()?,
            start_at,
            end_at,
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kernel::model::reservation::{Program, ReservationStatus, Slot};

    fn row() -> ReservationRow {
        let start_at = Utc.with_ymd_and_hms(2025, 9, 11, 1, 0, 0).unwrap();
        ReservationRow {
            id: 7,
            date: NaiveDate::from_ymd_opt(2025, 9, 11).unwrap(),
            program: "experience".into(),
            slot: "am".into(),
            room: Some("A".into()),
            name: "佐藤 花子".into(),
            last_name: Some("佐藤".into()),
            first_name: Some("花子".into()),
            email: Some("hanako@example.com".into()),
            phone: None,
            notebook_type: None,
            has_certificate: false,
            note: None,
            status: "booked".into(),
            start_at,
            end_at: start_at + chrono::Duration::hours(2),
            created_at: start_at,
            updated_at: start_at,
        }
    }

    #[test]
    fn row_converts_to_domain_entity() {
        let reservation = Reservation::try_from(row()).unwrap();
        assert_eq!(reservation.id.raw(), 7);
        assert_eq!(reservation.program, Program::Experience);
        assert_eq!(reservation.slot, Slot::Am);
        assert_eq!(reservation.status, ReservationStatus::Booked);
        assert!(reservation.start_at < reservation.end_at);
    }

    #[test]
    fn unknown_text_is_a_conversion_error() {
        let mut bad = row();
        bad.program = "workshop".into();
        assert!(matches!(
            Reservation::try_from(bad),
            Err(AppError::ConversionEntityError(_))
        ));

        let mut bad = row();
        bad.status = "pending".into();
        assert!(matches!(
            Reservation::try_from(bad),
            Err(AppError::ConversionEntityError(_))
        ));
    }
}
