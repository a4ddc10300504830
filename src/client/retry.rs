//! Retry configuration for SNMP requests.
//!
//! Both the async [`Client`](super::Client) and the sans-IO
//! [`Sequencer`](crate::sequencer::Sequencer) read the attempt budget from
//! here; the delay between attempts only matters to whoever owns the timer.

use std::time::Duration;

/// Retry configuration for SNMP requests.
///
/// # Examples
///
/// ```rust
/// use basic_snmp::Retry;
/// use std::time::Duration;
///
/// // No retries
/// let retry = Retry::none();
/// assert_eq!(retry.max_attempts, 0);
///
/// // Fixed delay between retries
/// let retry = Retry::fixed(3, Duration::from_millis(200));
/// assert_eq!(retry.compute_delay(2), Duration::from_millis(200));
///
/// // Doubling delay (100ms, 200ms, 400ms, capped at 1s)
/// let retry = Retry::exponential(5, Duration::from_millis(100), Duration::from_secs(1));
/// assert_eq!(retry.compute_delay(2), Duration::from_millis(400));
/// assert_eq!(retry.compute_delay(4), Duration::from_secs(1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Retry {
    /// Maximum number of retry attempts (0 = no retries, request sent once)
    pub max_attempts: u32,
    /// Backoff strategy between retries
    #[cfg_attr(feature = "serde", serde(default))]
    pub backoff: Backoff,
}

/// Backoff strategy between retry attempts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase", tag = "kind"))]
pub enum Backoff {
    /// Retry as soon as the timeout fires.
    #[default]
    None,

    /// Fixed delay between each retry attempt.
    Fixed {
        /// Delay before each retry
        delay: Duration,
    },

    /// Delay doubles after each attempt, up to `max`.
    Exponential {
        /// Delay before the first retry
        initial: Duration,
        /// Maximum delay cap
        max: Duration,
    },
}

impl Default for Retry {
    /// Default: 3 retries with no delay between attempts.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::None,
        }
    }
}

impl Retry {
    /// No retries - request is sent once and fails on timeout.
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            backoff: Backoff::None,
        }
    }

    /// Fixed delay between retries.
    pub fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: attempts,
            backoff: Backoff::Fixed { delay },
        }
    }

    /// Doubling delay between retries, starting at `initial` and capped at `max`.
    pub fn exponential(attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_attempts: attempts,
            backoff: Backoff::Exponential { initial, max },
        }
    }

    /// Compute the delay before retry number `attempt` (0-based).
    pub fn compute_delay(&self, attempt: u32) -> Duration {
        match &self.backoff {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { delay } => *delay,
            Backoff::Exponential { initial, max } => {
                // Clamp attempt to prevent overflow
                let multiplier = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
                initial.saturating_mul(multiplier).min(*max)
            }
        }
    }
}
