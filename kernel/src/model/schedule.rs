use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use shared::error::{AppError, AppResult};

use crate::model::reservation::{Program, Slot};

/// UTC の半開区間 [start_at, end_at)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl TimeWindow {
    /// 区間の交差判定。半開区間なので端点が一致するだけ（隣接）なら重複ではない
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start_at < other.end_at && self.end_at > other.start_at
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedWindow {
    pub date: NaiveDate,
    pub window: TimeWindow,
}

// (program, slot) → 会場ローカルの壁時計レンジ。
// この表が時間窓計算の唯一の出典であり、作成経路と更新経路で
// 別々の定義を持ってはいけない。
const SLOT_RANGES: &[(Program, Slot, (u32, u32), (u32, u32))] = &[
    (Program::Tour, Slot::Am, (10, 30), (12, 0)),
    (Program::Tour, Slot::Pm, (13, 0), (15, 0)),
    (Program::Experience, Slot::Am, (10, 0), (12, 0)),
    (Program::Experience, Slot::Pm, (13, 0), (15, 0)),
    (Program::Experience, Slot::Full, (10, 0), (15, 0)),
];

/// 起動時に一度だけ構築し、レジストリ経由で全経路に注入するスロット表。
/// 会場のタイムゾーンは固定オフセットとして設定から渡される。
#[derive(Debug, Clone)]
pub struct SlotTable {
    offset: FixedOffset,
}

impl SlotTable {
    pub fn new(utc_offset_hours: i32) -> AppResult<Self> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
            AppError::ConversionEntityError(format!(
                "invalid venue UTC offset: {utc_offset_hours}"
            ))
        })?;
        Ok(Self { offset })
    }

    /// 日付文字列（%Y-%m-%d）と (program, slot) から UTC の時間窓を解決する。
    /// 実在しない日付・許可されない組み合わせは InvalidSlot になる。
    pub fn resolve(&self, date: &str, program: Program, slot: Slot) -> AppResult<ResolvedWindow> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidSlot(format!("不正な日付です: {date}")))?;
        self.resolve_date(date, program, slot)
    }

    /// パース済みの日付から解決する（更新経路で既存の date を使う場合）
    pub fn resolve_date(
        &self,
        date: NaiveDate,
        program: Program,
        slot: Slot,
    ) -> AppResult<ResolvedWindow> {
        let (start, end) = SLOT_RANGES
            .iter()
            .find(|(p, s, _, _)| *p == program && *s == slot)
            .map(|(_, _, start, end)| (*start, *end))
            .ok_or_else(|| {
                AppError::InvalidSlot(format!(
                    "プログラム（{program}）では時間帯（{slot}）は指定できません。"
                ))
            })?;

        Ok(ResolvedWindow {
            date,
            window: TimeWindow {
                start_at: self.to_utc(date, start)?,
                end_at: self.to_utc(date, end)?,
            },
        })
    }

    fn to_utc(&self, date: NaiveDate, (hour, min): (u32, u32)) -> AppResult<DateTime<Utc>> {
        let time = NaiveTime::from_hms_opt(hour, min, 0).ok_or_else(|| {
            AppError::ConversionEntityError(format!("invalid wall-clock time: {hour:02}:{min:02}"))
        })?;
        // 固定オフセットなので単一解しかありえない
        match self.offset.from_local_datetime(&date.and_time(time)) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            _ => Err(AppError::ConversionEntityError(format!(
                "ambiguous local datetime: {date} {hour:02}:{min:02}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jst() -> SlotTable {
        SlotTable::new(9).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn every_table_entry_resolves_to_ordered_window() {
        let table = jst();
        let pairs = [
            (Program::Tour, Slot::Am),
            (Program::Tour, Slot::Pm),
            (Program::Experience, Slot::Am),
            (Program::Experience, Slot::Pm),
            (Program::Experience, Slot::Full),
        ];
        for (program, slot) in pairs {
            let resolved = table.resolve("2025-09-11", program, slot).unwrap();
            assert!(
                resolved.window.start_at < resolved.window.end_at,
                "{program}/{slot}"
            );
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let table = jst();
        let a = table
            .resolve("2025-09-11", Program::Experience, Slot::Am)
            .unwrap();
        let b = table
            .resolve("2025-09-11", Program::Experience, Slot::Am)
            .unwrap();
        assert_eq!(a.window, b.window);
        assert_eq!(a.date, b.date);
    }

    #[test]
    fn experience_am_converts_jst_to_utc() {
        // 10:00–12:00 JST → 01:00–03:00 UTC
        let resolved = jst()
            .resolve("2025-09-11", Program::Experience, Slot::Am)
            .unwrap();
        assert_eq!(resolved.window.start_at, utc(2025, 9, 11, 1, 0));
        assert_eq!(resolved.window.end_at, utc(2025, 9, 11, 3, 0));
    }

    #[test]
    fn tour_am_starts_half_hour_later() {
        // 10:30–12:00 JST → 01:30–03:00 UTC
        let resolved = jst().resolve("2025-09-11", Program::Tour, Slot::Am).unwrap();
        assert_eq!(resolved.window.start_at, utc(2025, 9, 11, 1, 30));
        assert_eq!(resolved.window.end_at, utc(2025, 9, 11, 3, 0));
    }

    #[test]
    fn experience_full_spans_business_day() {
        // 10:00–15:00 JST → 01:00–06:00 UTC
        let resolved = jst()
            .resolve("2025-09-11", Program::Experience, Slot::Full)
            .unwrap();
        assert_eq!(resolved.window.start_at, utc(2025, 9, 11, 1, 0));
        assert_eq!(resolved.window.end_at, utc(2025, 9, 11, 6, 0));
    }

    #[test]
    fn tour_full_is_rejected_for_every_date() {
        let table = jst();
        for date in ["2025-09-12", "2025-01-01", "2030-06-15"] {
            let err = table.resolve(date, Program::Tour, Slot::Full).unwrap_err();
            assert!(matches!(err, AppError::InvalidSlot(_)), "{date}");
        }
    }

    #[test]
    fn invalid_date_is_rejected_as_invalid_slot() {
        let table = jst();
        for date in ["2025-02-30", "not-a-date", "2025/09/11", ""] {
            let err = table
                .resolve(date, Program::Experience, Slot::Am)
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidSlot(_)), "{date}");
        }
    }

    #[test]
    fn full_overlaps_both_am_and_pm_of_same_program() {
        let table = jst();
        let full = table
            .resolve("2025-09-11", Program::Experience, Slot::Full)
            .unwrap()
            .window;
        let am = table
            .resolve("2025-09-11", Program::Experience, Slot::Am)
            .unwrap()
            .window;
        let pm = table
            .resolve("2025-09-11", Program::Experience, Slot::Pm)
            .unwrap()
            .window;
        assert!(full.overlaps(&am));
        assert!(full.overlaps(&pm));
        // am と pm 自体は重ならない
        assert!(!am.overlaps(&pm));
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let a = TimeWindow {
            start_at: utc(2025, 9, 11, 1, 0),
            end_at: utc(2025, 9, 11, 3, 0),
        };
        let b = TimeWindow {
            start_at: utc(2025, 9, 11, 3, 0),
            end_at: utc(2025, 9, 11, 6, 0),
        };
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn one_second_overlap_is_a_conflict() {
        let a = TimeWindow {
            start_at: utc(2025, 9, 11, 1, 0),
            end_at: utc(2025, 9, 11, 3, 0),
        };
        let b = TimeWindow {
            start_at: a.end_at - chrono::Duration::seconds(1),
            end_at: utc(2025, 9, 11, 6, 0),
        };
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // 同一窓も当然重複
        assert!(a.overlaps(&a));
    }

    #[test]
    fn different_dates_never_overlap() {
        let table = jst();
        let thu = table
            .resolve("2025-09-11", Program::Experience, Slot::Full)
            .unwrap()
            .window;
        let fri = table
            .resolve("2025-09-12", Program::Experience, Slot::Full)
            .unwrap()
            .window;
        assert!(!thu.overlaps(&fri));
    }

    #[test]
    fn offset_out_of_range_is_rejected() {
        assert!(SlotTable::new(9).is_ok());
        assert!(SlotTable::new(-5).is_ok());
        assert!(SlotTable::new(30).is_err());
    }
}
