use crate::duration::{ConversionError, Duration, NANOS_PER_SECOND};

impl TryFrom<chrono::TimeDelta> for Duration {
    type Error = ConversionError;

    fn try_from(value: chrono::TimeDelta) -> Result<Self, Self::Error> {
        let nanos = i128::from(value.num_seconds()) * i128::from(NANOS_PER_SECOND)
            + i128::from(value.subsec_nanos());
        Self::try_from_wide_nanos(nanos)
    }
}

impl From<Duration> for chrono::TimeDelta {
    fn from(value: Duration) -> Self {
        Self::nanoseconds(value.as_nanos())
    }
}
