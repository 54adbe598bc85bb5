use std::{
    collections::BTreeSet,
    num::{ParseFloatError, ParseIntError},
    str::FromStr,
};

use snafu::{ResultExt, Snafu, ensure};

use crate::duration::{
    Duration, NANOS_PER_DAY, NANOS_PER_HOUR, NANOS_PER_MINUTE, NANOS_PER_MONTH, NANOS_PER_SECOND,
    NANOS_PER_WEEK, NANOS_PER_YEAR,
};

const FRACTION_SEPARATOR: char = '.';

#[derive(Debug, Snafu, PartialEq)]
#[snafu(module)]
pub enum DurationParseError {
    #[snafu(display("invalid format: unexpected {sign} sign"))]
    UnexpectedSign { sign: Sign },

    #[snafu(display("invalid format: unexpected {field} designator"))]
    UnexpectedDesignator { field: Field },

    #[snafu(display("invalid format: unexpected value or designator {chr:?}"))]
    UnexpectedCharacter { chr: char },

    #[snafu(display("invalid format: missing designator for value {value:?}"))]
    MissingDesignator { value: String },

    #[snafu(display("invalid format: missing duration designator"))]
    MissingDurationDesignator,

    #[snafu(display("{field} parse failed: {source}"))]
    ParseInt { source: ParseIntError, field: Field },

    #[snafu(display("second parse failed: {source}"))]
    ParseFloat { source: ParseFloatError },
}

impl DurationParseError {
    /// Returns whether the input was malformed or one of its values could not be
    /// converted into a number.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ParseInt { .. } | Self::ParseFloat { .. } => ErrorCategory::ParseFailed,
            Self::UnexpectedSign { .. }
            | Self::UnexpectedDesignator { .. }
            | Self::UnexpectedCharacter { .. }
            | Self::MissingDesignator { .. }
            | Self::MissingDurationDesignator => ErrorCategory::InvalidFormat,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum ErrorCategory {
    #[strum(serialize = "invalid format")]
    InvalidFormat,

    #[strum(serialize = "parse failed")]
    ParseFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub const fn symbol(self) -> char {
        match self {
            Self::Positive => '+',
            Self::Negative => '-',
        }
    }
}

/// Every designator which can appear in an ISO 8601 duration. The order of
/// variants **MATTERS**. Designators must appear in the input in exactly this
/// order, and each of them at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Field {
    Duration,
    Year,
    Month,
    Week,
    Day,
    Time,
    Hour,
    Minute,
    Second,
}

impl Field {
    /// All fields which hold a whole number, from largest to smallest unit.
    pub(crate) const WHOLE_UNITS: [Self; 6] = [
        Self::Year,
        Self::Month,
        Self::Week,
        Self::Day,
        Self::Hour,
        Self::Minute,
    ];

    /// Returns the letter marking this field. Month and minute share the same
    /// letter, they are told apart by whether a `T` was parsed before.
    pub const fn designator(self) -> char {
        match self {
            Self::Duration => 'P',
            Self::Year => 'Y',
            Self::Month | Self::Minute => 'M',
            Self::Week => 'W',
            Self::Day => 'D',
            Self::Time => 'T',
            Self::Hour => 'H',
            Self::Second => 'S',
        }
    }

    /// Returns the number of nanoseconds in one unit of this field. The structural
    /// `P` and `T` designators don't carry a duration.
    pub const fn nanos(self) -> i64 {
        match self {
            Self::Year => NANOS_PER_YEAR,
            Self::Month => NANOS_PER_MONTH,
            Self::Week => NANOS_PER_WEEK,
            Self::Day => NANOS_PER_DAY,
            Self::Hour => NANOS_PER_HOUR,
            Self::Minute => NANOS_PER_MINUTE,
            Self::Second => NANOS_PER_SECOND,
            Self::Duration | Self::Time => 0,
        }
    }

    const fn mode(self) -> ParseMode {
        match self {
            Self::Hour | Self::Minute | Self::Second => ParseMode::Time,
            _ => ParseMode::Period,
        }
    }
}

/// Everything before the `T` designator is part of the period, everything after
/// it is part of the time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum ParseMode {
    #[default]
    Period,
    Time,
}

#[derive(Debug, Default)]
struct Parser {
    mode: ParseMode,
    sign: Option<Sign>,
    seen: BTreeSet<Field>,
    buffer: String,
    duration: Duration,
}

impl Parser {
    fn parse(mut self, input: &str) -> Result<Duration, DurationParseError> {
        use duration_parse_error::UnexpectedCharacterSnafu;

        for chr in input.chars() {
            match chr {
                '0'..='9' | FRACTION_SEPARATOR => self.buffer.push(chr),
                '+' => self.sign(Sign::Positive)?,
                '-' => self.sign(Sign::Negative)?,
                'P' => self.structural(Field::Duration)?,
                'T' => {
                    self.structural(Field::Time)?;
                    self.mode = ParseMode::Time;
                }
                'Y' => self.whole(Field::Year)?,
                'M' => match self.mode {
                    ParseMode::Period => self.whole(Field::Month)?,
                    ParseMode::Time => self.whole(Field::Minute)?,
                },
                'W' => self.whole(Field::Week)?,
                'D' => self.whole(Field::Day)?,
                'H' => self.whole(Field::Hour)?,
                'S' => {
                    // Seconds are always the last field, the remaining input is
                    // not inspected.
                    self.seconds()?;
                    break;
                }
                chr => return UnexpectedCharacterSnafu { chr }.fail(),
            }
        }

        self.finish()
    }

    fn sign(&mut self, sign: Sign) -> Result<(), DurationParseError> {
        use duration_parse_error::UnexpectedSignSnafu;

        self.ensure_no_pending_value()?;
        ensure!(
            self.sign.is_none() && self.seen.is_empty(),
            UnexpectedSignSnafu { sign }
        );

        self.sign = Some(sign);
        self.duration.negative = sign == Sign::Negative;
        Ok(())
    }

    fn structural(&mut self, field: Field) -> Result<(), DurationParseError> {
        self.ensure_no_pending_value()?;
        self.accept(field)
    }

    fn whole(&mut self, field: Field) -> Result<(), DurationParseError> {
        use duration_parse_error::ParseIntSnafu;

        self.accept(field)?;

        let count = self
            .buffer
            .parse::<u64>()
            .context(ParseIntSnafu { field })?;

        self.buffer.clear();
        self.duration.add_component(field, count);
        Ok(())
    }

    fn seconds(&mut self) -> Result<(), DurationParseError> {
        use duration_parse_error::ParseFloatSnafu;

        self.accept(Field::Second)?;

        let seconds = self.buffer.parse::<f64>().context(ParseFloatSnafu)?;

        self.buffer.clear();
        self.duration.add_seconds(seconds);
        Ok(())
    }

    /// Records `field` as seen. Fails if the field is used in the wrong mode,
    /// before the duration designator, twice, or after a field which must follow
    /// it.
    fn accept(&mut self, field: Field) -> Result<(), DurationParseError> {
        use duration_parse_error::UnexpectedDesignatorSnafu;

        let in_order = self.seen.last().is_none_or(|last| *last < field);
        let has_duration = field == Field::Duration || self.seen.contains(&Field::Duration);

        ensure!(
            in_order && has_duration && field.mode() == self.mode,
            UnexpectedDesignatorSnafu { field }
        );

        self.seen.insert(field);
        Ok(())
    }

    fn ensure_no_pending_value(&self) -> Result<(), DurationParseError> {
        use duration_parse_error::MissingDesignatorSnafu;

        ensure!(
            self.buffer.is_empty(),
            MissingDesignatorSnafu {
                value: self.buffer.clone()
            }
        );

        Ok(())
    }

    fn finish(self) -> Result<Duration, DurationParseError> {
        use duration_parse_error::MissingDurationDesignatorSnafu;

        self.ensure_no_pending_value()?;
        ensure!(
            self.seen.contains(&Field::Duration),
            MissingDurationDesignatorSnafu
        );

        Ok(self.duration)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match Parser::default().parse(input) {
            Ok(duration) => {
                tracing::trace!(input, nanos = duration.as_nanos(), "parsed duration");
                Ok(duration)
            }
            Err(error) => {
                tracing::debug!(input, %error, "failed to parse duration");
                Err(error)
            }
        }
    }
}
