use crate::model::id::ReservationId;
use crate::model::reservation::{Program, ReservationStatus, Slot};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateReservation {
    pub date: String,
    pub program: Program,
    pub slot: Slot,
    pub room: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notebook_type: Option<String>,
    pub has_certificate: bool,
    pub note: Option<String>,
    pub status: ReservationStatus,
}

/// 部分更新イベント。None のフィールドは既存値を維持する
#[derive(Debug, new)]
pub struct UpdateReservation {
    pub reservation_id: ReservationId,
    pub date: Option<String>,
    pub program: Option<Program>,
    pub slot: Option<Slot>,
    pub room: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notebook_type: Option<String>,
    pub has_certificate: Option<bool>,
    pub note: Option<String>,
    pub status: Option<ReservationStatus>,
}

impl UpdateReservation {
    /// date / program / slot のいずれかが来たときだけ時間窓を再計算する。
    /// ステータスのみの更新で start_at / end_at を動かしてはいけない。
    pub fn moves_window(&self) -> bool {
        self.date.is_some() || self.program.is_some() || self.slot.is_some()
    }

    pub fn touches_name(&self) -> bool {
        self.name.is_some() || self.last_name.is_some() || self.first_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_only_patch() -> UpdateReservation {
        UpdateReservation::new(
            ReservationId::new(1),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            Some(ReservationStatus::Cancelled),
        )
    }

    #[test]
    fn status_only_patch_does_not_move_window() {
        let patch = status_only_patch();
        assert!(!patch.moves_window());
        assert!(!patch.touches_name());
    }

    #[test]
    fn slot_change_moves_window() {
        let mut patch = status_only_patch();
        patch.slot = Some(Slot::Pm);
        assert!(patch.moves_window());
    }
}
