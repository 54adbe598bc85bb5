//! This module contains the ISO 8601 [`Duration`] struct which is able to parse
//! durations like `PT30S`, `P2WT4H` or `-P3Y6M4DT12H30M5.5S`, and format them back
//! into their canonical textual form. It additionally implements [`JsonSchema`],
//! [`Deserialize`][serde::Deserialize] and [`Serialize`][serde::Serialize], which
//! makes it usable in structured documents like JSON or YAML.
//!
//! Every component is converted using fixed factors. A year always spans 365 days
//! and a month is a twelfth of a year. Durations are therefore not calendar aware.
//! The accumulated value is kept as a signed 64-bit nanosecond count, which covers
//! roughly 292 years in each direction. Larger values wrap around.

use std::{
    borrow::Cow,
    fmt::{Display, Write},
};

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use snafu::{OptionExt, Snafu};

mod parse;
mod serde_impl;
mod std_impl;

#[cfg(feature = "chrono")]
mod chrono_impl;

#[cfg(feature = "jiff")]
mod jiff_impl;

#[cfg(feature = "time")]
mod time_impl;

pub use parse::*;

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
pub const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;
pub const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR;
pub const NANOS_PER_WEEK: i64 = 7 * NANOS_PER_DAY;
pub const NANOS_PER_YEAR: i64 = 365 * NANOS_PER_DAY;
pub const NANOS_PER_MONTH: i64 = NANOS_PER_YEAR / 12;

const ZERO_DURATION: &str = "PT0S";

const DURATION_PATTERN: &str = r"^[+-]?P([0-9]+Y)?([0-9]+M)?([0-9]+W)?([0-9]+D)?(T([0-9]+H)?([0-9]+M)?(([0-9]+(\.[0-9]*)?|\.[0-9]+)S)?)?$";

// 2^64, the modulus of two's complement 64-bit arithmetic.
const WRAP_MODULUS: f64 = 18_446_744_073_709_551_616.0;

#[derive(Debug, Snafu, PartialEq)]
pub enum ConversionError {
    #[snafu(display(
        "duration of {nanos} nanoseconds does not fit into a signed 64-bit nanosecond count"
    ))]
    OutOfRange { nanos: i128 },

    #[snafu(display("negative duration cannot be converted into an unsigned duration"))]
    Negative,
}

/// An ISO 8601 duration, like `P3Y6M4DT12H30M5.5S`.
///
/// The individual components are retained as they were parsed (or decomposed by
/// [`Duration::from_nanos`]), which allows formatting the duration without losing
/// the units it was specified in. All components are non-negative, the sign is
/// tracked separately.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Duration {
    total: i64,
    negative: bool,

    years: u64,
    months: u64,
    weeks: u64,
    days: u64,
    hours: u64,
    minutes: u64,
    seconds: f64,
}

impl Duration {
    pub const ZERO: Self = Self {
        total: 0,
        negative: false,
        years: 0,
        months: 0,
        weeks: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0.0,
    };

    /// Decomposes a signed nanosecond count into the largest possible units,
    /// starting with years and ending with minutes. The remaining sub-minute part
    /// is stored as (fractional) seconds.
    pub fn from_nanos(nanos: i64) -> Self {
        if nanos == 0 {
            return Self::ZERO;
        }

        let mut duration = Self {
            total: nanos.wrapping_abs(),
            negative: nanos < 0,
            ..Self::ZERO
        };

        let mut rest = nanos.unsigned_abs();

        for field in Field::WHOLE_UNITS {
            let unit = field.nanos().unsigned_abs();

            if let Some(count) = duration.component_mut(field) {
                *count = rest / unit;
            }

            rest %= unit;
        }

        let second = NANOS_PER_SECOND.unsigned_abs();
        duration.seconds = (rest / second) as f64 + (rest % second) as f64 / second as f64;

        duration
    }

    /// Returns the signed number of nanoseconds this duration spans.
    pub const fn as_nanos(&self) -> i64 {
        if self.negative {
            self.total.wrapping_neg()
        } else {
            self.total
        }
    }

    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns `true` if the duration spans no time at all, regardless of its sign.
    pub const fn is_zero(&self) -> bool {
        self.total == 0
    }

    pub const fn years(&self) -> u64 {
        self.years
    }

    pub const fn months(&self) -> u64 {
        self.months
    }

    pub const fn weeks(&self) -> u64 {
        self.weeks
    }

    pub const fn days(&self) -> u64 {
        self.days
    }

    pub const fn hours(&self) -> u64 {
        self.hours
    }

    pub const fn minutes(&self) -> u64 {
        self.minutes
    }

    /// Returns the seconds component, including the sub-second fraction.
    pub const fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Stores `count` in the component belonging to `field` and adds its
    /// nanoseconds to the running total.
    fn add_component(&mut self, field: Field, count: u64) {
        if let Some(component) = self.component_mut(field) {
            *component = count;
        }

        // Overflow wraps around like native two's complement arithmetic.
        #[allow(clippy::cast_possible_wrap)]
        let nanos = (count as i64).wrapping_mul(field.nanos());
        self.total = self.total.wrapping_add(nanos);
    }

    fn add_seconds(&mut self, seconds: f64) {
        self.seconds = seconds;

        // Rounded to the nearest nanosecond, so formatted fractions parse back
        // into the exact same count. Overflow wraps around like it does for the
        // whole-number components.
        let nanos = (seconds * NANOS_PER_SECOND as f64)
            .round()
            .rem_euclid(WRAP_MODULUS);

        #[allow(clippy::cast_possible_wrap)]
        let nanos = nanos as u64 as i64;
        self.total = self.total.wrapping_add(nanos);
    }

    fn component_mut(&mut self, field: Field) -> Option<&mut u64> {
        match field {
            Field::Year => Some(&mut self.years),
            Field::Month => Some(&mut self.months),
            Field::Week => Some(&mut self.weeks),
            Field::Day => Some(&mut self.days),
            Field::Hour => Some(&mut self.hours),
            Field::Minute => Some(&mut self.minutes),
            Field::Duration | Field::Time | Field::Second => None,
        }
    }

    /// Converts a nanosecond count of a wider integer type, as returned by other
    /// time libraries.
    fn try_from_wide_nanos(nanos: i128) -> Result<Self, ConversionError> {
        match i64::try_from(nanos).ok().context(OutOfRangeSnafu { nanos }) {
            Ok(nanos) => Ok(Self::from_nanos(nanos)),
            Err(error) => {
                tracing::debug!(%error, "failed to convert duration");
                Err(error)
            }
        }
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Zero is always printed as 'PT0S', an empty 'P' is not a valid duration.
        if self.is_zero() {
            return f.write_str(ZERO_DURATION);
        }

        if self.negative {
            f.write_char(Sign::Negative.symbol())?;
        }

        f.write_char(Field::Duration.designator())?;

        let period = [
            (Field::Year, self.years),
            (Field::Month, self.months),
            (Field::Week, self.weeks),
            (Field::Day, self.days),
        ];

        for (field, count) in period {
            if count != 0 {
                write!(f, "{count}{designator}", designator = field.designator())?;
            }
        }

        if self.hours == 0 && self.minutes == 0 && self.seconds == 0.0 {
            return Ok(());
        }

        f.write_char(Field::Time.designator())?;

        for (field, count) in [(Field::Hour, self.hours), (Field::Minute, self.minutes)] {
            if count != 0 {
                write!(f, "{count}{designator}", designator = field.designator())?;
            }
        }

        if self.seconds != 0.0 {
            // The Display impl of f64 produces the shortest representation which
            // round-trips, without an exponent or trailing zeros.
            write!(
                f,
                "{seconds}{designator}",
                seconds = self.seconds,
                designator = Field::Second.designator()
            )?;
        }

        Ok(())
    }
}

impl JsonSchema for Duration {
    fn schema_name() -> Cow<'static, str> {
        "Duration".into()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "description": "An ISO 8601 duration, like `P3Y6M4DT12H30M5S`. Input following the seconds is ignored when parsing",
            "pattern": DURATION_PATTERN,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NANOS_PER_HOUR, Duration { total: NANOS_PER_HOUR, hours: 1, ..Duration::ZERO })]
    #[case(
        NANOS_PER_YEAR + NANOS_PER_WEEK + NANOS_PER_DAY + 2 * NANOS_PER_HOUR,
        Duration {
            total: NANOS_PER_YEAR + NANOS_PER_WEEK + NANOS_PER_DAY + 2 * NANOS_PER_HOUR,
            years: 1,
            weeks: 1,
            days: 1,
            hours: 2,
            ..Duration::ZERO
        }
    )]
    #[case(
        -(2 * NANOS_PER_MONTH + NANOS_PER_SECOND),
        Duration {
            total: 2 * NANOS_PER_MONTH + NANOS_PER_SECOND,
            negative: true,
            months: 2,
            seconds: 1.0,
            ..Duration::ZERO
        }
    )]
    #[case(
        NANOS_PER_SECOND + 500_000_000,
        Duration { total: NANOS_PER_SECOND + 500_000_000, seconds: 1.5, ..Duration::ZERO }
    )]
    #[case(0, Duration::ZERO)]
    fn from_nanos(#[case] nanos: i64, #[case] expected: Duration) {
        let duration = Duration::from_nanos(nanos);
        assert_eq!(duration, expected);
    }

    #[test]
    fn from_nanos_month_remainder() {
        // Five weeks exceed a month (30.41 days) by a bit more than four days.
        let duration = Duration::from_nanos(5 * NANOS_PER_WEEK);
        assert_eq!(duration.months(), 1);
        assert_eq!(duration.weeks(), 0);
        assert_eq!(duration.days(), 4);
        assert_eq!(duration.hours(), 14);
        assert_eq!(duration.as_nanos(), 5 * NANOS_PER_WEEK);
    }

    #[rstest]
    #[case(Duration { total: NANOS_PER_HOUR + NANOS_PER_SECOND, ..Duration::ZERO }, NANOS_PER_HOUR + NANOS_PER_SECOND)]
    #[case(Duration { total: NANOS_PER_HOUR + NANOS_PER_SECOND, negative: true, ..Duration::ZERO }, -(NANOS_PER_HOUR + NANOS_PER_SECOND))]
    #[case(Duration::ZERO, 0)]
    fn as_nanos(#[case] duration: Duration, #[case] expected: i64) {
        assert_eq!(duration.as_nanos(), expected);
    }

    #[test]
    fn as_nanos_min_value() {
        let duration = Duration::from_nanos(i64::MIN);
        assert!(duration.is_negative());
        assert_eq!(duration.as_nanos(), i64::MIN);
    }

    #[rstest]
    #[case(0, "PT0S")]
    #[case(NANOS_PER_HOUR, "PT1H")]
    #[case(-NANOS_PER_HOUR, "-PT1H")]
    #[case(90 * NANOS_PER_MINUTE, "PT1H30M")]
    #[case(2 * NANOS_PER_WEEK + 4 * NANOS_PER_HOUR, "P2WT4H")]
    #[case(3 * NANOS_PER_DAY, "P3D")]
    #[case(NANOS_PER_MINUTE + 1, "PT1M0.000000001S")]
    #[case(1_500_000_000, "PT1.5S")]
    #[case(NANOS_PER_YEAR + NANOS_PER_MONTH + 5 * NANOS_PER_SECOND, "P1Y1MT5S")]
    fn to_string(#[case] nanos: i64, #[case] expected: &str) {
        assert_eq!(Duration::from_nanos(nanos).to_string(), expected);
    }

    #[test]
    fn negative_zero_to_string() {
        let duration = Duration {
            negative: true,
            ..Duration::ZERO
        };
        assert_eq!(duration.to_string(), "PT0S");
    }

    #[test]
    fn json_schema() {
        let schema = schemars::schema_for!(Duration);
        let schema = serde_json::to_value(&schema).unwrap();

        assert_eq!(schema["type"], "string");
        assert_eq!(schema["pattern"], DURATION_PATTERN);
    }

    #[rstest]
    #[case("PT1H")]
    #[case("-P3Y6M4DT12H30M5.5S")]
    #[case("+P2WT4H")]
    #[case("P")]
    #[case("PT")]
    #[case("PT1.S")]
    #[case("PT.5S")]
    #[case("PT.S")]
    #[case("PTS")]
    #[case("P1D1Y")]
    #[case("P1H")]
    #[case("PT1.5")]
    #[case("P١D")]
    #[case("1Y")]
    #[case("")]
    fn json_schema_pattern_matches_parser(#[case] input: &str) {
        let pattern = regex::Regex::new(DURATION_PATTERN).unwrap();

        assert_eq!(
            pattern.is_match(input),
            input.parse::<Duration>().is_ok(),
            "pattern and parser disagree on {input:?}"
        );
    }

    #[rstest]
    #[case("P9999999999999Y", 9_999_999_999_999_i64.wrapping_mul(NANOS_PER_YEAR))]
    #[case("PT155000000M", 155_000_000_i64.wrapping_mul(NANOS_PER_MINUTE))]
    #[case("PT9300000000S", 155_000_000_i64.wrapping_mul(NANOS_PER_MINUTE))]
    #[case("P292YT9300000000S", (292 * NANOS_PER_YEAR).wrapping_add(155_000_000_i64.wrapping_mul(NANOS_PER_MINUTE)))]
    fn parse_overflow_wraps(#[case] input: &str, #[case] expected: i64) {
        let duration: Duration = input.parse().unwrap();
        assert_eq!(duration.as_nanos(), expected);
    }

    #[test]
    fn parse_huge_seconds_wraps() {
        // 2^50 seconds exceed the nanosecond range by far.
        let duration: Duration = "PT1125899906842624S".parse().unwrap();

        assert_ne!(duration.as_nanos(), i64::MAX);
        assert_eq!(
            duration.as_nanos(),
            1_125_899_906_842_624_i64.wrapping_mul(NANOS_PER_SECOND)
        );
    }
}
