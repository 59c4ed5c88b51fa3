use std::sync::Arc;

use async_trait::async_trait;
use sqlx::Postgres;

use kernel::model::{
    id::ReservationId,
    reservation::{
        display_name,
        event::{CreateReservation, UpdateReservation},
        Program, Reservation,
    },
    schedule::{SlotTable, TimeWindow},
};
use kernel::repository::reservation::{ReservationFilter, ReservationRepository};
use shared::error::{AppError, AppResult};

use crate::database::{model::reservation::ReservationRow, ConnectionPool};

// マイグレーションで定義している排他制約の名前。
// コミット時の競合をこの名前と SQLSTATE で構造的に識別する
// （エラーメッセージの部分一致には決して頼らない）。
const NO_OVERLAP_CONSTRAINT: &str = "reservations_no_overlap";
// exclusion_violation
const EXCLUSION_VIOLATION_CODE: &str = "23P01";

const CONFLICT_MESSAGE: &str = "同一プログラム内で時間帯が重複しています。";

const RESERVATION_COLUMNS: &str = "\
    id, date, program, slot, room, name, last_name, first_name, email, phone, \
    notebook_type, has_certificate, note, status, start_at, end_at, created_at, updated_at";

pub struct ReservationRepositoryImpl {
    db: ConnectionPool,
    slots: Arc<SlotTable>,
}

impl ReservationRepositoryImpl {
    pub fn new(db: ConnectionPool, slots: Arc<SlotTable>) -> Self {
        Self { db, slots }
    }
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    // 予約操作を行う
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation> {
        // 時間窓はスロット表から一元的に解決する
        let resolved = self
            .slots
            .resolve(&event.date, event.program, event.slot)?;
        let name = display_name(
            event.name.as_deref(),
            event.last_name.as_deref(),
            event.first_name.as_deref(),
        );

        let mut tx = self.db.begin().await?;

        // 事前チェック：同一プログラムの有効予約（booked/done）と
        // 時間窓が交差していないかを確認する。
        // ここは取り違えのない 409 を速く返すためのものであり、
        // 正しさの担保はコミット時に評価される排他制約の方にある。
        // cancelled として作る行は重複してよいのでチェックしない
        if event.status.is_active() {
            ensure_no_overlap(&mut tx, event.program, &resolved.window, None).await?;
        }

        let insert_sql = format!(
            r#"
            INSERT INTO reservations
            (date, program, slot, room, name, last_name, first_name, email, phone,
             notebook_type, has_certificate, note, status, start_at, end_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {RESERVATION_COLUMNS}
            "#
        );
        let row: ReservationRow = sqlx::query_as(&insert_sql)
            .bind(resolved.date)
            .bind(event.program.as_str())
            .bind(event.slot.as_str())
            .bind(&event.room)
            .bind(&name)
            .bind(&event.last_name)
            .bind(&event.first_name)
            .bind(&event.email)
            .bind(&event.phone)
            .bind(&event.notebook_type)
            .bind(event.has_certificate)
            .bind(&event.note)
            .bind(event.status.as_str())
            .bind(resolved.window.start_at)
            .bind(resolved.window.end_at)
            .fetch_one(&mut *tx)
            .await
            // 事前チェックをすり抜けた並行書き込みは制約違反として現れるので、
            // ここでも ScheduleConflict に分類し直す
            .map_err(classify_write_error)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        row.try_into()
    }

    // 部分更新を行う
    async fn update(&self, event: UpdateReservation) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;

        // 対象行をロックして取得し、パッチをマージする
        let select_sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1 FOR UPDATE"
        );
        let current: Option<ReservationRow> = sqlx::query_as(&select_sql)
            .bind(event.reservation_id.raw())
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        let Some(current) = current else {
            return Err(AppError::EntityNotFound(format!(
                "予約（ID={}）が見つかりませんでした。",
                event.reservation_id
            )));
        };
        let current: Reservation = current.try_into()?;

        let program = event.program.unwrap_or(current.program);
        let slot = event.slot.unwrap_or(current.slot);
        let status = event.status.unwrap_or(current.status);

        // date / program / slot のいずれかが来たときだけ時間窓を再計算する。
        // ステータスのみの更新で start_at / end_at が動いてはいけない
        let (date, window) = if event.moves_window() {
            let resolved = match &event.date {
                Some(date) => self.slots.resolve(date, program, slot)?,
                None => self.slots.resolve_date(current.date, program, slot)?,
            };
            (resolved.date, resolved.window)
        } else {
            (
                current.date,
                TimeWindow {
                    start_at: current.start_at,
                    end_at: current.end_at,
                },
            )
        };

        // 更新後が有効（booked/done）になる場合のみ、自分自身を除外して
        // 重複を再チェックする。窓が動くケースに加え、cancelled から
        // 復帰するケースも既存の窓のままで再チェックが要る
        let becomes_active = status.is_active() && !current.status.is_active();
        if status.is_active() && (event.moves_window() || becomes_active) {
            ensure_no_overlap(&mut tx, program, &window, Some(current.id)).await?;
        }

        // 氏名系フィールドが来たときだけ表示名を組み直す
        let name = if event.touches_name() {
            display_name(
                event.name.as_deref(),
                event
                    .last_name
                    .as_deref()
                    .or(current.last_name.as_deref()),
                event
                    .first_name
                    .as_deref()
                    .or(current.first_name.as_deref()),
            )
        } else {
            current.name.clone()
        };

        let update_sql = format!(
            r#"
            UPDATE reservations
            SET date = $2,
                program = $3,
                slot = $4,
                room = $5,
                name = $6,
                last_name = $7,
                first_name = $8,
                email = $9,
                phone = $10,
                notebook_type = $11,
                has_certificate = $12,
                note = $13,
                status = $14,
                start_at = $15,
                end_at = $16,
                updated_at = now()
            WHERE id = $1
            RETURNING {RESERVATION_COLUMNS}
            "#
        );
        let row: ReservationRow = sqlx::query_as(&update_sql)
            .bind(current.id.raw())
            .bind(date)
            .bind(program.as_str())
            .bind(slot.as_str())
            .bind(event.room.or(current.room))
            .bind(&name)
            .bind(event.last_name.or(current.last_name))
            .bind(event.first_name.or(current.first_name))
            .bind(event.email.or(current.email))
            .bind(event.phone.or(current.phone))
            .bind(event.notebook_type.or(current.notebook_type))
            .bind(event.has_certificate.unwrap_or(current.has_certificate))
            .bind(event.note.or(current.note))
            .bind(status.as_str())
            .bind(window.start_at)
            .bind(window.end_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify_write_error)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        row.try_into()
    }

    // 物理削除を行う
    async fn delete(&self, reservation_id: ReservationId) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(reservation_id.raw())
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "予約（ID={reservation_id}）が見つかりませんでした。"
            )));
        }

        Ok(())
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Reservation> {
        let select_sql =
            format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1");
        let row: Option<ReservationRow> = sqlx::query_as(&select_sql)
            .bind(reservation_id.raw())
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        match row {
            Some(row) => row.try_into(),
            None => Err(AppError::EntityNotFound(format!(
                "予約（ID={reservation_id}）が見つかりませんでした。"
            ))),
        }
    }

    // 絞り込み付きの一覧を取得する
    async fn find_all(&self, filter: ReservationFilter) -> AppResult<Vec<Reservation>> {
        let list_sql = format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE ($1::date IS NULL OR date = $1)
              AND ($2::text IS NULL OR program = $2)
              AND ($3::text IS NULL OR slot = $3)
              AND ($4::text IS NULL OR room = $4)
            ORDER BY date ASC, start_at ASC
            "#
        );
        let rows: Vec<ReservationRow> = sqlx::query_as(&list_sql)
            .bind(filter.date)
            .bind(filter.program.map(|p| p.as_str()))
            .bind(filter.slot.map(|s| s.as_str()))
            .bind(filter.room)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Reservation::try_from).collect()
    }
}

// トランザクション内で、同一プログラムの有効予約との時間窓交差を調べる。
// 交差条件：existing.start_at < new.end_at AND existing.end_at > new.start_at
// （半開区間なので、端がちょうど接している場合は重複にならない）
async fn ensure_no_overlap(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    program: Program,
    window: &TimeWindow,
    exclude: Option<ReservationId>,
) -> AppResult<()> {
    let hit: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT id
        FROM reservations
        WHERE program = $1
          AND status IN ('booked', 'done')
          AND ($2::bigint IS NULL OR id <> $2)
          AND start_at < $4
          AND end_at > $3
        LIMIT 1
        "#,
    )
    .bind(program.as_str())
    .bind(exclude.map(|id| id.raw()))
    .bind(window.start_at)
    .bind(window.end_at)
    .fetch_optional(&mut **tx)
    .await
    .map_err(AppError::SpecificOperationError)?;

    if hit.is_some() {
        return Err(AppError::ScheduleConflict(CONFLICT_MESSAGE.into()));
    }

    Ok(())
}

// 書き込み時の sqlx エラーを分類する。
// 排他制約 reservations_no_overlap の違反（SQLSTATE 23P01）だけを
// ScheduleConflict に写し、それ以外の制約違反は握りつぶさず
// ストレージ障害としてそのまま上げる。
fn classify_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.code().as_deref() == Some(EXCLUSION_VIOLATION_CODE)
            && db.constraint() == Some(NO_OVERLAP_CONSTRAINT)
        {
            return AppError::ScheduleConflict(CONFLICT_MESSAGE.into());
        }
    }
    AppError::SpecificOperationError(e)
}
