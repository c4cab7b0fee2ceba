/*! Time structures.

The stack never reads a clock on its own. Every timestamp comes from the device (see
[`nic::Device::timestamp`]) so that tests can step time deterministically.

 - [Instant] is used to represent absolute time.
 - [Duration] is used to represent relative time.
 - [Expiration] is the deadline of a cached entry, possibly infinite.

[`nic::Device::timestamp`]: ../nic/trait.Device.html#tymethod.timestamp
[Instant]: struct.Instant.html
[Duration]: struct.Duration.html
[Expiration]: enum.Expiration.html
*/
use core::{cmp, fmt, ops};
use core::convert::TryFrom;
pub use core::time::Duration;

/// A representation of an absolute time value.
///
/// The `Instant` type is a wrapper around a `i64` value that represents a number of milliseconds,
/// monotonically increasing since an arbitrary moment in time, such as system startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Instant {
    millis: i64,
}

/// An expiration time, inversion of `Option`.
///
/// Orders `Never` after every `When`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Expires at the given instant.
    When(Instant),
    /// Never expires.
    Never,
}

use Expiration::{When, Never};

impl Instant {
    /// Create a new `Instant` from a number of milliseconds.
    pub fn from_millis<T: Into<i64>>(millis: T) -> Instant {
        Instant { millis: millis.into() }
    }

    /// Create a new `Instant` from a number of seconds.
    pub fn from_secs<T: Into<i64>>(secs: T) -> Instant {
        Instant { millis: secs.into() * 1000 }
    }

    /// The fractional number of milliseconds that have passed since the beginning of time.
    pub fn millis(&self) -> i64 {
        self.millis % 1000
    }

    /// The number of whole seconds that have passed since the beginning of time.
    pub fn secs(&self) -> i64 {
        self.millis / 1000
    }

    /// The total number of milliseconds that have passed since the beginning of time.
    pub fn total_millis(&self) -> i64 {
        self.millis
    }
}

impl Expiration {
    /// The deadline of something stamped at `stamp` that lives for `ttl`.
    ///
    /// A zero `ttl` means the entry never expires.
    pub fn after(stamp: Instant, ttl: Duration) -> Self {
        if ttl == Duration::from_millis(0) {
            Never
        } else {
            When(stamp + ttl)
        }
    }

    /// Check if the deadline lies strictly after `now`.
    pub fn is_alive_at(self, now: Instant) -> bool {
        When(now) < self
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:03}s", self.secs(), self.millis())
    }
}

/// Whole milliseconds of a duration, saturating at the largest representable instant.
fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::max_value())
}

impl ops::Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant::from_millis(self.millis.saturating_add(duration_millis(rhs)))
    }
}

impl ops::AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl ops::Sub<Duration> for Instant {
    type Output = Instant;

    fn sub(self, rhs: Duration) -> Instant {
        Instant::from_millis(self.millis.saturating_sub(duration_millis(rhs)))
    }
}

impl ops::Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        let diff = i128::from(self.millis) - i128::from(rhs.millis);
        Duration::from_millis(diff.abs() as u64)
    }
}

impl Default for Expiration {
    fn default() -> Self {
        Expiration::Never
    }
}

impl From<Option<Instant>> for Expiration {
    fn from(opt: Option<Instant>) -> Self {
        match opt {
            Some(instant) => When(instant),
            None => Never,
        }
    }
}

impl cmp::PartialOrd<Self> for Expiration {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl cmp::Ord for Expiration {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match (*self, *other) {
            (Never, Never) => cmp::Ordering::Equal,
            (Never, When(_)) => cmp::Ordering::Greater,
            (When(_), Never) => cmp::Ordering::Less,
            (When(ref a), When(ref b)) => a.cmp(b),
        }
    }
}
