use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ValidationError;

const INPUT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none]-[month padding:none]-[year]");
const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]-[month]-[year]");
const DAY_MONTH_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]-[month]");
const ISO_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date as used by the console input and the exported sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDate(Date);

impl TradingDate {
    /// Parse the `DD-MM-YYYY` form typed at the prompt. Leading zeros are
    /// optional, so `1-7-2024` is accepted too.
    pub fn parse_display(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        Date::parse(trimmed, INPUT_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: trimmed.to_owned(),
            })
    }

    pub fn parse_iso(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input.trim(), ISO_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.trim().to_owned(),
            })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    /// Calendar date of a provider timestamp shifted into the exchange's local time.
    pub fn from_unix_timestamp(ts: i64, utc_offset_secs: i64) -> Result<Self, ValidationError> {
        let local = ts.saturating_add(utc_offset_secs);
        OffsetDateTime::from_unix_timestamp(local)
            .map(|value| Self(value.date()))
            .map_err(|_| ValidationError::DateOutOfRange {
                value: ts.to_string(),
            })
    }

    /// Unix timestamp of midnight UTC on this date.
    pub fn unix_midnight(self) -> i64 {
        self.0.midnight().assume_utc().unix_timestamp()
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    /// `DD-MM-YYYY`, the form written to the sheet.
    pub fn format_display(self) -> String {
        self.format_with(DISPLAY_FORMAT)
    }

    /// `DD-MM`, the form used in output file names.
    pub fn format_day_month(self) -> String {
        self.format_with(DAY_MONTH_FORMAT)
    }

    /// `YYYY-MM-DD`.
    pub fn format_iso(self) -> String {
        self.format_with(ISO_FORMAT)
    }

    fn format_with(self, format: &[BorrowedFormatItem<'_>]) -> String {
        // Every item in these descriptions is a plain date component, which `Date` always supplies.
        self.0
            .format(format)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }
}

impl Display for TradingDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for TradingDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for TradingDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse_iso(&value).map_err(D::Error::custom)
    }
}

/// Half-open `[start, end)` span of calendar days requested from the provider.
///
/// An inverted span is representable; it is forwarded as-is and simply
/// contains no dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: TradingDate,
    pub end: TradingDate,
}

impl DateRange {
    pub const fn new(start: TradingDate, end: TradingDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: TradingDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_month_year() {
        let date = TradingDate::parse_display("01-07-2024").expect("must parse");
        assert_eq!(date.format_iso(), "2024-07-01");
        assert_eq!(date.format_display(), "01-07-2024");
        assert_eq!(date.format_day_month(), "01-07");
    }

    #[test]
    fn leading_zeros_are_optional() {
        let date = TradingDate::parse_display("1-7-2024").expect("must parse");
        assert_eq!(date.format_iso(), "2024-07-01");
        assert_eq!(date.format_display(), "01-07-2024");
    }

    #[test]
    fn rejects_iso_and_impossible_dates() {
        assert!(matches!(
            TradingDate::parse_display("2024-07-01"),
            Err(ValidationError::InvalidDate { .. })
        ));
        assert!(matches!(
            TradingDate::parse_display("31-02-2024"),
            Err(ValidationError::InvalidDate { .. })
        ));
        assert!(matches!(
            TradingDate::parse_display(""),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn shifts_timestamps_into_exchange_time() {
        // 2024-01-02T14:30:00Z, a New York open
        let ny = TradingDate::from_unix_timestamp(1_704_205_800, -18_000).expect("valid");
        assert_eq!(ny.format_iso(), "2024-01-02");

        // 2024-01-04T00:00:00Z is 09:00 on the 4th in Tokyo and 23:00 on the 3rd at UTC-1
        let tokyo = TradingDate::from_unix_timestamp(1_704_326_400, 32_400).expect("valid");
        assert_eq!(tokyo.format_iso(), "2024-01-04");
        let behind = TradingDate::from_unix_timestamp(1_704_326_400, -3_600).expect("valid");
        assert_eq!(behind.format_iso(), "2024-01-03");
    }

    #[test]
    fn midnight_round_trips_through_timestamp() {
        let date = TradingDate::parse_display("05-01-2024").expect("valid");
        assert_eq!(date.unix_midnight(), 1_704_412_800);
        assert_eq!(
            TradingDate::from_unix_timestamp(date.unix_midnight(), 0).expect("valid"),
            date
        );
    }

    #[test]
    fn range_is_half_open() {
        let start = TradingDate::parse_display("01-01-2024").expect("valid");
        let end = TradingDate::parse_display("05-01-2024").expect("valid");
        let range = DateRange::new(start, end);
        assert!(range.contains(start));
        assert!(!range.contains(end));
        assert!(!range.is_inverted());
        assert!(DateRange::new(end, start).is_inverted());
    }
}
