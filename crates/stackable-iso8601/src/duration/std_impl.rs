use snafu::OptionExt;

use crate::duration::{ConversionError, Duration, NegativeSnafu};

impl TryFrom<std::time::Duration> for Duration {
    type Error = ConversionError;

    fn try_from(value: std::time::Duration) -> Result<Self, Self::Error> {
        // Any std duration fits into an i128 nanosecond count.
        let nanos = i128::try_from(value.as_nanos()).unwrap_or(i128::MAX);
        Self::try_from_wide_nanos(nanos)
    }
}

impl TryFrom<Duration> for std::time::Duration {
    type Error = ConversionError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        let nanos = u64::try_from(value.as_nanos()).ok().context(NegativeSnafu);

        match nanos {
            Ok(nanos) => Ok(Self::from_nanos(nanos)),
            Err(error) => {
                tracing::debug!(%value, %error, "failed to convert duration");
                Err(error)
            }
        }
    }
}
