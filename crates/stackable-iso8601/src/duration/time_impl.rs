use crate::duration::{ConversionError, Duration};

impl TryFrom<time::Duration> for Duration {
    type Error = ConversionError;

    fn try_from(value: time::Duration) -> Result<Self, Self::Error> {
        Self::try_from_wide_nanos(value.whole_nanoseconds())
    }
}

impl From<Duration> for time::Duration {
    fn from(value: Duration) -> Self {
        Self::nanoseconds(value.as_nanos())
    }
}
