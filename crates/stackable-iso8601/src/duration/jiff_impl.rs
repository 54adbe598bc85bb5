use jiff::SignedDuration;

use crate::duration::{ConversionError, Duration};

impl TryFrom<SignedDuration> for Duration {
    type Error = ConversionError;

    fn try_from(value: SignedDuration) -> Result<Self, Self::Error> {
        Self::try_from_wide_nanos(value.as_nanos())
    }
}

impl From<Duration> for SignedDuration {
    fn from(value: Duration) -> Self {
        Self::from_nanos(value.as_nanos())
    }
}
