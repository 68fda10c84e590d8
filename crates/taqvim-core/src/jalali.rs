//! Gregorian → Jalali (Solar Hijri) conversion.
//!
//! Conversion is pure day-count arithmetic over the 33-year intercalation
//! cycle. Names are produced in two steps: the arithmetic yields canonical,
//! transliterated identifiers (`Farvardin`, `Shanbeh`), and a static lookup
//! table translates those into the Persian names stored and displayed by the
//! calendar.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, FromRepr, IntoEnumIterator as _};

use crate::{Error, Result};

/// Gregorian years the converter accepts. Outside this window the cycle
/// arithmetic drifts from the astronomical calendar.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1800..=2400;

/// Offset between chrono's day count (0001-01-01 is day 1) and the day count
/// the cycle arithmetic starts from.
const FORWARD_EPOCH_OFFSET: i64 = 356_032;

/// Offset of the inverse arithmetic's day count relative to chrono's.
const INVERSE_EPOCH_OFFSET: i64 = 365;

const DAYS_PER_CYCLE: i64 = 12_053;
const DAYS_PER_QUAD: i64 = 1_461;

// ─── Canonical identifiers ───────────────────────────────────────────────────

/// The four seasons, each spanning three consecutive months.
///
/// `Display` yields the transliterated identifier; the serialised form is the
/// Persian name.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  AsRefStr, EnumIter,
)]
pub enum Season {
  #[serde(rename = "بهار")]
  Bahar,
  #[serde(rename = "تابستان")]
  Tabestan,
  #[serde(rename = "پاییز")]
  Paeez,
  #[serde(rename = "زمستان")]
  Zemestan,
}

impl Season {
  pub fn local_name(self) -> &'static str {
    match self {
      Self::Bahar => "بهار",
      Self::Tabestan => "تابستان",
      Self::Paeez => "پاییز",
      Self::Zemestan => "زمستان",
    }
  }

  /// Inverse of [`Season::local_name`].
  pub fn from_local_name(name: &str) -> Option<Self> {
    Self::iter().find(|s| s.local_name() == name)
  }
}

/// Jalali months, numbered from 1.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter,
  FromRepr,
)]
#[repr(u8)]
pub enum JalaliMonth {
  Farvardin = 1,
  Ordibehesht,
  Khordad,
  Tir,
  Mordad,
  Shahrivar,
  Mehr,
  Aban,
  Azar,
  Dey,
  Bahman,
  Esfand,
}

impl JalaliMonth {
  pub fn from_number(month: u32) -> Option<Self> {
    u8::try_from(month).ok().and_then(Self::from_repr)
  }

  pub fn number(self) -> u32 { u32::from(self as u8) }

  pub fn season(self) -> Season { SEASONS[self as usize - 1] }
}

/// Persian weekdays; the week starts on Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum JalaliWeekday {
  Shanbeh,
  Yekshanbeh,
  Doshanbeh,
  Seshanbeh,
  Chaharshanbeh,
  Panjshanbeh,
  Jomeh,
}

impl From<Weekday> for JalaliWeekday {
  fn from(w: Weekday) -> Self {
    match w {
      Weekday::Sat => Self::Shanbeh,
      Weekday::Sun => Self::Yekshanbeh,
      Weekday::Mon => Self::Doshanbeh,
      Weekday::Tue => Self::Seshanbeh,
      Weekday::Wed => Self::Chaharshanbeh,
      Weekday::Thu => Self::Panjshanbeh,
      Weekday::Fri => Self::Jomeh,
    }
  }
}

// ─── Lookup tables ───────────────────────────────────────────────────────────

/// Season of each month, indexed by month number minus one.
const SEASONS: [Season; 12] = [
  Season::Bahar,
  Season::Bahar,
  Season::Bahar,
  Season::Tabestan,
  Season::Tabestan,
  Season::Tabestan,
  Season::Paeez,
  Season::Paeez,
  Season::Paeez,
  Season::Zemestan,
  Season::Zemestan,
  Season::Zemestan,
];

const MONTH_NAMES: [(&str, &str); 12] = [
  ("Farvardin", "فروردین"),
  ("Ordibehesht", "اردیبهشت"),
  ("Khordad", "خرداد"),
  ("Tir", "تیر"),
  ("Mordad", "مرداد"),
  ("Shahrivar", "شهریور"),
  ("Mehr", "مهر"),
  ("Aban", "آبان"),
  ("Azar", "آذر"),
  ("Dey", "دی"),
  ("Bahman", "بهمن"),
  ("Esfand", "اسفند"),
];

const WEEKDAY_NAMES: [(&str, &str); 7] = [
  ("Shanbeh", "شنبه"),
  ("Yekshanbeh", "یکشنبه"),
  ("Doshanbeh", "دوشنبه"),
  ("Seshanbeh", "سه\u{200c}شنبه"),
  ("Chaharshanbeh", "چهارشنبه"),
  ("Panjshanbeh", "پنج\u{200c}شنبه"),
  ("Jomeh", "جمعه"),
];

fn lookup<'a>(table: &[(&'static str, &'static str)], key: &'a str) -> &'a str {
  table
    .iter()
    .find(|(canonical, _)| *canonical == key)
    .map_or(key, |&(_, local)| local)
}

/// Persian name for a canonical month identifier. Unknown identifiers are
/// returned unchanged.
pub fn localize_month(canonical: &str) -> &str { lookup(&MONTH_NAMES, canonical) }

/// Persian name for a canonical weekday identifier. Unknown identifiers are
/// returned unchanged.
pub fn localize_weekday(canonical: &str) -> &str { lookup(&WEEKDAY_NAMES, canonical) }

// ─── Dates ───────────────────────────────────────────────────────────────────

/// A validated Jalali calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JalaliDate {
  pub year:  i32,
  pub month: JalaliMonth,
  pub day:   u32,
}

impl std::fmt::Display for JalaliDate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:04}-{:02}-{:02}", self.year, self.month.number(), self.day)
  }
}

/// The full result of converting one Gregorian date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDate {
  pub jalali:     JalaliDate,
  /// `YYYY-MM-DD`, zero padded.
  pub date:       String,
  pub day_name:   String,
  pub month_name: String,
  pub season:     Season,
}

/// Convert a Gregorian date into its Jalali date, weekday, month and season.
pub fn convert(date: NaiveDate) -> Result<LocalDate> {
  let jalali = to_jalali(date)?;
  let weekday = JalaliWeekday::from(date.weekday());

  Ok(LocalDate {
    jalali,
    date: jalali.to_string(),
    day_name: localize_weekday(weekday.as_ref()).to_owned(),
    month_name: localize_month(jalali.month.as_ref()).to_owned(),
    season: jalali.month.season(),
  })
}

/// Convert a Gregorian date into a Jalali date.
pub fn to_jalali(date: NaiveDate) -> Result<JalaliDate> {
  if !SUPPORTED_YEARS.contains(&date.year()) {
    return Err(Error::DateOutOfRange(date));
  }

  let mut days = i64::from(date.num_days_from_ce()) + FORWARD_EPOCH_OFFSET;
  let mut year = -1595 + 33 * (days / DAYS_PER_CYCLE);
  days %= DAYS_PER_CYCLE;
  year += 4 * (days / DAYS_PER_QUAD);
  days %= DAYS_PER_QUAD;
  if days > 365 {
    year += (days - 1) / 365;
    days = (days - 1) % 365;
  }

  let (month, day) = if days < 186 {
    (1 + days / 31, 1 + days % 31)
  } else {
    (7 + (days - 186) / 30, 1 + (days - 186) % 30)
  };

  // Both values are bounded by the arithmetic above.
  let month = u32::try_from(month)
    .ok()
    .and_then(JalaliMonth::from_number)
    .ok_or(Error::DateOutOfRange(date))?;
  let year = i32::try_from(year).map_err(|_| Error::DateOutOfRange(date))?;
  let day = u32::try_from(day).map_err(|_| Error::DateOutOfRange(date))?;

  Ok(JalaliDate { year, month, day })
}

/// Convert a Jalali date back into the Gregorian calendar.
pub fn to_gregorian(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
  let invalid = || Error::InvalidJalaliDate { year, month, day };

  let jalali_month = JalaliMonth::from_number(month).ok_or_else(invalid)?;
  if !(1..=9999).contains(&year) || day == 0 || day > days_in_month(year, jalali_month) {
    return Err(invalid());
  }

  let days = inverse_day_count(year, month, day) - INVERSE_EPOCH_OFFSET;
  let date = i32::try_from(days)
    .ok()
    .and_then(NaiveDate::from_num_days_from_ce_opt)
    .ok_or_else(invalid)?;

  if !SUPPORTED_YEARS.contains(&date.year()) {
    return Err(Error::DateOutOfRange(date));
  }
  Ok(date)
}

/// Whether Esfand of `year` has 30 days.
pub fn is_leap_year(year: i32) -> bool {
  inverse_day_count(year + 1, 1, 1) - inverse_day_count(year, 1, 1) == 366
}

pub fn days_in_month(year: i32, month: JalaliMonth) -> u32 {
  match month.number() {
    1..=6 => 31,
    7..=11 => 30,
    _ if is_leap_year(year) => 30,
    _ => 29,
  }
}

/// Gregorian dates of 1 Farvardin and the last day of Esfand of `year`.
pub fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate)> {
  let first = to_gregorian(year, 1, 1)?;
  let last = to_gregorian(year, 12, days_in_month(year, JalaliMonth::Esfand))?;
  Ok((first, last))
}

fn inverse_day_count(year: i32, month: u32, day: u32) -> i64 {
  let y = i64::from(year) + 1595;
  let month = i64::from(month);
  let month_offset = if month < 7 {
    (month - 1) * 31
  } else {
    (month - 7) * 30 + 186
  };
  -355_668 + 365 * y + (y / 33) * 8 + ((y % 33) + 3) / 4 + i64::from(day) + month_offset
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  #[test]
  fn nowruz_1404() {
    let local = convert(ymd(2025, 3, 21)).unwrap();
    assert_eq!(local.date, "1404-01-01");
    assert_eq!(local.jalali.month, JalaliMonth::Farvardin);
    assert_eq!(local.month_name, "فروردین");
    assert_eq!(local.season, Season::Bahar);
    // 2025-03-21 was a Friday.
    assert_eq!(local.day_name, "جمعه");
  }

  #[test]
  fn last_day_of_1404_is_esfand_29() {
    let local = convert(ymd(2026, 3, 20)).unwrap();
    assert_eq!(local.date, "1404-12-29");
    assert_eq!(local.month_name, "اسفند");
    assert_eq!(local.season, Season::Zemestan);
  }

  #[test]
  fn leap_year_1403_has_esfand_30() {
    assert!(is_leap_year(1403));
    assert!(!is_leap_year(1404));
    assert_eq!(to_jalali(ymd(2025, 3, 20)).unwrap().to_string(), "1403-12-30");
    assert_eq!(to_jalali(ymd(2024, 3, 20)).unwrap().to_string(), "1403-01-01");
  }

  #[test]
  fn month_boundaries_switch_from_31_to_30_days() {
    // 31 Shahrivar 1404 → 1 Mehr 1404.
    assert_eq!(to_jalali(ymd(2025, 9, 22)).unwrap().to_string(), "1404-06-31");
    assert_eq!(to_jalali(ymd(2025, 9, 23)).unwrap().to_string(), "1404-07-01");
  }

  #[test]
  fn weekday_names_include_zero_width_non_joiner() {
    // 2025-03-25 was a Tuesday.
    let local = convert(ymd(2025, 3, 25)).unwrap();
    assert_eq!(local.day_name, "سه\u{200c}شنبه");
  }

  #[test]
  fn every_day_of_1404_round_trips() {
    let (first, last) = year_bounds(1404).unwrap();
    assert_eq!(first, ymd(2025, 3, 21));
    assert_eq!(last, ymd(2026, 3, 20));

    let mut seen = 0;
    for date in first.iter_days().take_while(|d| *d <= last) {
      let j = to_jalali(date).unwrap();
      assert_eq!(j.year, 1404, "{date} converted to {j}");
      assert_eq!(to_gregorian(j.year, j.month.number(), j.day).unwrap(), date);
      seen += 1;
    }
    assert_eq!(seen, 365);
  }

  #[test]
  fn seasons_rotate_every_three_months() {
    let seasons: Vec<Season> = JalaliMonth::iter().map(JalaliMonth::season).collect();
    assert_eq!(&seasons[0..3], &[Season::Bahar; 3]);
    assert_eq!(&seasons[3..6], &[Season::Tabestan; 3]);
    assert_eq!(&seasons[6..9], &[Season::Paeez; 3]);
    assert_eq!(&seasons[9..12], &[Season::Zemestan; 3]);
  }

  #[test]
  fn unknown_names_pass_through() {
    assert_eq!(localize_month("Thermidor"), "Thermidor");
    assert_eq!(localize_weekday("Caturday"), "Caturday");
    assert_eq!(localize_month("Dey"), "دی");
  }

  #[test]
  fn season_local_names_round_trip() {
    for season in Season::iter() {
      assert_eq!(Season::from_local_name(season.local_name()), Some(season));
    }
    assert_eq!(Season::from_local_name("spring"), None);
  }

  #[test]
  fn out_of_range_dates_fail_loudly() {
    assert!(matches!(to_jalali(ymd(1200, 1, 1)), Err(Error::DateOutOfRange(_))));
    assert!(matches!(convert(ymd(3000, 6, 1)), Err(Error::DateOutOfRange(_))));
  }

  #[test]
  fn invalid_jalali_dates_are_rejected() {
    assert!(matches!(to_gregorian(1404, 13, 1), Err(Error::InvalidJalaliDate { .. })));
    assert!(matches!(to_gregorian(1404, 7, 31), Err(Error::InvalidJalaliDate { .. })));
    assert!(matches!(to_gregorian(1404, 12, 30), Err(Error::InvalidJalaliDate { .. })));
    assert!(matches!(to_gregorian(1404, 1, 0), Err(Error::InvalidJalaliDate { .. })));
    assert_eq!(to_gregorian(1403, 12, 30).unwrap(), ymd(2025, 3, 20));
  }
}
