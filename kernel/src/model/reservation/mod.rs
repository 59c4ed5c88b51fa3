use crate::model::id::ReservationId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use std::fmt;
use std::str::FromStr;

pub mod event;

/// 予約者名が空のときに name へ入れる表示用プレースホルダー
pub const GUEST_PLACEHOLDER: &str = "guest";

/// 予約対象のプログラム種別。重複チェックはこの単位でスコープされる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Program {
    Tour,
    Experience,
}

impl Program {
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::Tour => "tour",
            Program::Experience => "experience",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Program {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tour" => Ok(Program::Tour),
            "experience" => Ok(Program::Experience),
            other => Err(AppError::ConversionEntityError(format!(
                "unknown program: {other}"
            ))),
        }
    }
}

/// 時間帯。実際の時刻範囲は program との組でスロット表から引く
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Am,
    Pm,
    Full,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Am => "am",
            Slot::Pm => "pm",
            Slot::Full => "full",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "am" => Ok(Slot::Am),
            "pm" => Ok(Slot::Pm),
            "full" => Ok(Slot::Full),
            other => Err(AppError::ConversionEntityError(format!(
                "unknown slot: {other}"
            ))),
        }
    }
}

/// 予約ステータス。遷移ガードは設けず、列挙値ならいつでも設定できる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Booked,
    Done,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Booked => "booked",
            ReservationStatus::Done => "done",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// booked / done のみが重複チェックの対象になる
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationStatus::Booked | ReservationStatus::Done)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booked" => Ok(ReservationStatus::Booked),
            "done" => Ok(ReservationStatus::Done),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            other => Err(AppError::ConversionEntityError(format!(
                "unknown status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reservation {
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

/// 表示用の予約者名を決める。
/// 明示された name が非空ならそれを優先し、なければ姓・名の連結、
/// どちらも無ければプレースホルダーを返す。
pub fn display_name(
    name: Option<&str>,
    last_name: Option<&str>,
    first_name: Option<&str>,
) -> String {
    if let Some(n) = name {
        let n = n.trim();
        if !n.is_empty() {
            return n.to_string();
        }
    }

    let joined = [last_name, first_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        GUEST_PLACEHOLDER.to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_name_takes_precedence() {
        assert_eq!(
            display_name(Some("山田太郎"), Some("佐藤"), Some("花子")),
            "山田太郎"
        );
    }

    #[test]
    fn name_falls_back_to_last_and_first() {
        assert_eq!(display_name(None, Some("佐藤"), Some("花子")), "佐藤 花子");
        assert_eq!(display_name(Some(""), Some("佐藤"), None), "佐藤");
        assert_eq!(display_name(Some("  "), None, Some("花子")), "花子");
    }

    #[test]
    fn name_falls_back_to_placeholder() {
        assert_eq!(display_name(None, None, None), GUEST_PLACEHOLDER);
        assert_eq!(display_name(Some(""), Some(" "), None), GUEST_PLACEHOLDER);
    }

    #[test]
    fn program_and_slot_round_trip() {
        for p in [Program::Tour, Program::Experience] {
            assert_eq!(p.as_str().parse::<Program>().unwrap(), p);
        }
        for s in [Slot::Am, Slot::Pm, Slot::Full] {
            assert_eq!(s.as_str().parse::<Slot>().unwrap(), s);
        }
        assert!("fullday".parse::<Slot>().is_err());
        assert!("Tour".parse::<Program>().is_err());
    }

    #[test]
    fn only_booked_and_done_are_active() {
        assert!(ReservationStatus::Booked.is_active());
        assert!(ReservationStatus::Done.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
    }
}
