//! Restaurant vocabulary: participating days, time slots, and offerings.
//!
//! Both enums are persisted as their canonical names (`"Monday"`,
//! `"Dinner"`) in the remote store and the mirror. Parsing is
//! case-insensitive so query strings like `?day=friday` work.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Weekday
-------------------------------------------------------------------------- */

/// A day of the week a restaurant participates in the promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All days in display order (Monday first).
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Zero-based position in [`Weekday::ALL`], stored alongside the name in
    /// the mirror so ordering can happen in SQL.
    pub fn ordinal(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid day '{trimmed}'. Must be one of: {}",
                    Weekday::ALL.map(Weekday::as_str).join(", ")
                ))
            })
    }
}

/* --------------------------------------------------------------------------
Time slot
-------------------------------------------------------------------------- */

/// The meal service an offering applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeSlot {
    Brunch,
    Lunch,
    Dinner,
}

impl TimeSlot {
    /// All slots in display order.
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Brunch, TimeSlot::Lunch, TimeSlot::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeSlot::Brunch => "Brunch",
            TimeSlot::Lunch => "Lunch",
            TimeSlot::Dinner => "Dinner",
        }
    }

    pub fn ordinal(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSlot {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        TimeSlot::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid time slot '{trimmed}'. Must be one of: {}",
                    TimeSlot::ALL.map(TimeSlot::as_str).join(", ")
                ))
            })
    }
}

/* --------------------------------------------------------------------------
Offering
-------------------------------------------------------------------------- */

/// One (day, time slot, price) combination a restaurant participates with.
///
/// Price is the prix-fixe menu price in whole US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offering {
    pub day: Weekday,
    pub time_slot: TimeSlot,
    pub price: i32,
}

impl Offering {
    /// Sort key used for display: day order, then time slot, then price.
    pub fn display_key(&self) -> (Weekday, TimeSlot, i32) {
        (self.day, self.time_slot, self.price)
    }
}

/// Sort offerings into display order in place.
pub fn sort_offerings(offerings: &mut [Offering]) {
    offerings.sort_by_key(Offering::display_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_parses_case_insensitively() {
        assert_eq!("friday".parse::<Weekday>().unwrap(), Weekday::Friday);
        assert_eq!(" SUNDAY ".parse::<Weekday>().unwrap(), Weekday::Sunday);
    }

    #[test]
    fn weekday_rejects_abbreviations() {
        assert!("Mon".parse::<Weekday>().is_err());
    }

    #[test]
    fn weekday_ordinals_follow_display_order() {
        let ordinals: Vec<i64> = Weekday::ALL.iter().map(|d| d.ordinal()).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn time_slot_round_trips_through_name() {
        for slot in TimeSlot::ALL {
            assert_eq!(slot.as_str().parse::<TimeSlot>().unwrap(), slot);
        }
    }

    #[test]
    fn time_slot_error_lists_valid_values() {
        let err = "supper".parse::<TimeSlot>().unwrap_err().to_string();
        assert!(err.contains("Brunch, Lunch, Dinner"), "got: {err}");
    }

    #[test]
    fn offerings_sort_by_day_then_slot() {
        let mut offerings = vec![
            Offering { day: Weekday::Tuesday, time_slot: TimeSlot::Lunch, price: 35 },
            Offering { day: Weekday::Monday, time_slot: TimeSlot::Dinner, price: 60 },
            Offering { day: Weekday::Monday, time_slot: TimeSlot::Lunch, price: 35 },
        ];
        sort_offerings(&mut offerings);
        assert_eq!(offerings[0].day, Weekday::Monday);
        assert_eq!(offerings[0].time_slot, TimeSlot::Lunch);
        assert_eq!(offerings[1].time_slot, TimeSlot::Dinner);
        assert_eq!(offerings[2].day, Weekday::Tuesday);
    }

    #[test]
    fn offering_serializes_with_canonical_names() {
        let offering = Offering { day: Weekday::Saturday, time_slot: TimeSlot::Brunch, price: 45 };
        let json = serde_json::to_value(offering).unwrap();
        assert_eq!(json["day"], "Saturday");
        assert_eq!(json["time_slot"], "Brunch");
        assert_eq!(json["price"], 45);
    }
}
