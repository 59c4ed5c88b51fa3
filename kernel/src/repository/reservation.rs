use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

use crate::model::{
    id::ReservationId,
    reservation::{
        event::{CreateReservation, UpdateReservation},
        Program, Reservation, Slot,
    },
};

/// 一覧取得の絞り込み条件。すべて完全一致
#[derive(Debug, Default)]
pub struct ReservationFilter {
    pub date: Option<NaiveDate>,
    pub program: Option<Program>,
    pub slot: Option<Slot>,
    pub room: Option<String>,
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    // 予約を作成する。同一プログラム内で時間帯が重複する場合は ScheduleConflict
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation>;
    // 部分更新を適用する。date / program / slot が含まれる場合は
    // 時間窓を再計算し、自分自身を除外して重複を再チェックする
    async fn update(&self, event: UpdateReservation) -> AppResult<Reservation>;
    // 物理削除する
    async fn delete(&self, reservation_id: ReservationId) -> AppResult<()>;
    // reservation_id から単一の予約を取得する
    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Reservation>;
    // 絞り込み付きの一覧を (date, start_at) 昇順で取得する
    async fn find_all(&self, filter: ReservationFilter) -> AppResult<Vec<Reservation>>;
}
