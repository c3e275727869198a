use crate::bitmap::{BlockMap, IterOnes};
use crate::source::{BoxedSource, RandomSource, default_source};
use core::fmt::{Debug, Formatter};
use core::iter::FusedIterator;
use log::{debug, trace};

/// Range used when none is given, or when a range of `0` is requested.
pub const DEFAULT_RANGE: usize = 10;

#[inline]
fn effective_range(range: usize) -> usize {
    if range == 0 { DEFAULT_RANGE } else { range }
}

/// Reasons a value cannot be released back to a [`UniqueRand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReleaseError {
    /// The value lies outside `[0, range)`.
    #[error("value {value} is outside of the range [0, {range})")]
    OutOfRange {
        /// The rejected value.
        value: usize,
        /// The range at the time of the call.
        range: usize,
    },
    /// The value is in range but not currently allocated.
    #[error("value {0} is not allocated")]
    NotAllocated(usize),
}

/// Settings applied by [`UniqueRand::configure`] and
/// [`UniqueRand::from_config`].
///
/// Omitted settings fall back to their defaults: a range of
/// [`DEFAULT_RANGE`] and a [`RngSource`] seeded from OS entropy.
///
/// # Examples
/// ```
/// use unique_rand::{Config, UniqueRand};
///
/// let uniq = UniqueRand::from_config(Config::new().range(100).source(|r: usize| r - 1));
/// assert_eq!(uniq.range(), 100);
/// ```
///
/// [`RngSource`]: crate::RngSource
#[derive(Default)]
pub struct Config {
    range: usize,
    source: Option<BoxedSource>,
}

impl Config {
    /// Creates a config with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the exclusive upper bound of the generated values. `0` selects
    /// [`DEFAULT_RANGE`].
    pub fn range(mut self, range: usize) -> Self {
        self.range = range;
        self
    }

    /// Sets the source candidate values are drawn from.
    pub fn source(mut self, source: impl RandomSource + Send + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("range", &effective_range(self.range))
            .field("custom_source", &self.source.is_some())
            .finish()
    }
}

/// Hands out unique pseudo-random values from `[0, range)`.
///
/// A value returned by [`get`] is not returned again until it is released
/// with [`put`]. Candidates come from a [`RandomSource`]; when a candidate is
/// already taken, the lowest free value is handed out instead. Allocation
/// state is kept in a [`BlockMap`], one bit per value.
///
/// The default value is ready to use and equivalent to
/// `UniqueRand::new(DEFAULT_RANGE)`.
///
/// The type does no internal locking. Share it between threads behind a
/// `Mutex`; a shared reference alone cannot allocate:
/// ```compile_fail
/// use unique_rand::UniqueRand;
///
/// let uniq = UniqueRand::new(4);
/// let shared = &uniq;
/// shared.get();
/// ```
///
/// # Examples
/// ```
/// use unique_rand::UniqueRand;
///
/// let mut uniq = UniqueRand::new(3);
/// let mut seen: Vec<usize> = std::iter::from_fn(|| uniq.get()).collect();
/// seen.sort();
/// assert_eq!(seen, vec![0, 1, 2]);
/// assert_eq!(uniq.get(), None);
///
/// assert!(uniq.put(1));
/// assert!(!uniq.put(1));
/// assert_eq!(uniq.get(), Some(1));
/// ```
///
/// [`get`]: UniqueRand::get
/// [`put`]: UniqueRand::put
pub struct UniqueRand {
    range: usize,
    count: usize,
    bits: BlockMap,
    source: BoxedSource,
}

impl UniqueRand {
    /// Creates an allocator over `[0, range)` using the default source. A
    /// `range` of `0` selects [`DEFAULT_RANGE`].
    pub fn new(range: usize) -> Self {
        Self::from_parts(range, default_source())
    }

    /// Creates an allocator over `[0, range)` drawing candidates from
    /// `source`.
    ///
    /// # Examples
    /// ```
    /// use unique_rand::UniqueRand;
    ///
    /// let mut uniq = UniqueRand::with_source(5, |_: usize| 0);
    /// assert_eq!(uniq.get(), Some(0));
    /// assert_eq!(uniq.get(), Some(1));
    /// ```
    pub fn with_source(range: usize, source: impl RandomSource + Send + 'static) -> Self {
        Self::from_parts(range, Box::new(source))
    }

    /// Creates an allocator from a [`Config`].
    pub fn from_config(config: Config) -> Self {
        Self::from_parts(config.range, config.source.unwrap_or_else(default_source))
    }

    fn from_parts(range: usize, source: BoxedSource) -> Self {
        let range = effective_range(range);
        Self {
            range,
            count: 0,
            bits: BlockMap::with_capacity(range),
            source,
        }
    }

    /// Discards all allocations and switches to `[0, range)`. A `range` of
    /// `0` selects [`DEFAULT_RANGE`]. The source is kept.
    ///
    /// # Examples
    /// ```
    /// use unique_rand::UniqueRand;
    ///
    /// let mut uniq = UniqueRand::new(4);
    /// uniq.get();
    /// uniq.reset(0);
    /// assert_eq!(uniq.range(), 10);
    /// assert_eq!(uniq.count(), 0);
    /// ```
    pub fn reset(&mut self, range: usize) {
        self.range = effective_range(range);
        self.count = 0;
        self.bits.reset(self.range);
        debug!("unique_rand reset to range {}", self.range);
    }

    /// Discards all allocations, then applies `config`. A config without a
    /// source installs a fresh default source.
    pub fn configure(&mut self, config: Config) {
        self.reset(config.range);
        self.source = config.source.unwrap_or_else(default_source);
    }

    /// Replaces the source without touching allocation state.
    pub fn set_source(&mut self, source: impl RandomSource + Send + 'static) {
        self.source = Box::new(source);
    }

    /// Returns the exclusive upper bound of the values handed out. Never `0`.
    #[inline]
    pub fn range(&self) -> usize {
        self.range
    }

    /// Returns the number of values currently allocated.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the number of values still available.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.range - self.count
    }

    /// Returns `true` if no value is allocated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` if every value of the range is allocated.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.range
    }

    /// Returns `true` if `value` is currently allocated. Values outside the
    /// range are never allocated.
    #[inline]
    pub fn used(&self, value: usize) -> bool {
        value < self.range && self.bits.is_set(value)
    }

    /// Allocates a value that is not currently in use.
    ///
    /// Draws one candidate from the source and takes it if it is free.
    /// Otherwise the lowest free value is taken. Returns `None` once every
    /// value of the range is allocated.
    pub fn get(&mut self) -> Option<usize> {
        let candidate = self.source.next_below(self.range);
        if candidate >= self.range {
            debug!(
                "random source returned {candidate}, outside of [0, {})",
                self.range
            );
            return self.get_slow();
        }

        let (block_idx, word, mask) = self.bits.locate(candidate);
        if word & mask == 0 {
            self.bits.set(candidate);
            self.count += 1;
            return Some(candidate);
        }
        trace!("candidate {candidate} in block {block_idx} already taken");
        self.get_slow()
    }

    fn get_slow(&mut self) -> Option<usize> {
        match self.bits.first_unset() {
            // bits at or past the range only pad the last block
            Some(value) if value < self.range => {
                trace!("fallback scan claimed {value}");
                self.bits.set(value);
                self.count += 1;
                Some(value)
            }
            _ => {
                debug!("range [0, {}) exhausted", self.range);
                None
            }
        }
    }

    /// Releases `value` so that it can be handed out again. Returns `false`
    /// without changing anything if `value` is out of range or not
    /// allocated.
    #[inline]
    pub fn put(&mut self, value: usize) -> bool {
        self.release(value).is_ok()
    }

    /// Like [`put`], but reports why a release was rejected.
    ///
    /// # Examples
    /// ```
    /// use unique_rand::{ReleaseError, UniqueRand};
    ///
    /// let mut uniq = UniqueRand::with_source(4, |_: usize| 2);
    /// assert_eq!(uniq.get(), Some(2));
    /// assert_eq!(uniq.release(2), Ok(()));
    /// assert_eq!(uniq.release(2), Err(ReleaseError::NotAllocated(2)));
    /// assert_eq!(
    ///     uniq.release(9),
    ///     Err(ReleaseError::OutOfRange { value: 9, range: 4 })
    /// );
    /// ```
    ///
    /// [`put`]: UniqueRand::put
    pub fn release(&mut self, value: usize) -> Result<(), ReleaseError> {
        if value >= self.range {
            return Err(ReleaseError::OutOfRange {
                value,
                range: self.range,
            });
        }
        if !self.bits.is_set(value) {
            return Err(ReleaseError::NotAllocated(value));
        }
        self.bits.unset(value);
        self.count -= 1;
        Ok(())
    }

    /// Returns an iterator over the allocated values, in ascending order.
    ///
    /// # Examples
    /// ```
    /// use unique_rand::UniqueRand;
    ///
    /// let mut uniq = UniqueRand::with_source(40, |_: usize| 35);
    /// uniq.get();
    /// uniq.get();
    /// assert_eq!(uniq.iter().collect::<Vec<_>>(), vec![0, 35]);
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            ones: self.bits.iter_ones(),
            remaining: self.count,
        }
    }
}

impl Default for UniqueRand {
    fn default() -> Self {
        Self::new(DEFAULT_RANGE)
    }
}

impl Debug for UniqueRand {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UniqueRand")
            .field("range", &self.range)
            .field("count", &self.count)
            .field("bits", &self.bits)
            .finish_non_exhaustive()
    }
}

impl<'uniq> IntoIterator for &'uniq UniqueRand {
    type Item = usize;
    type IntoIter = Iter<'uniq>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the values currently allocated by a [`UniqueRand`].
///
/// Returned by [`UniqueRand::iter()`].
#[derive(Clone)]
pub struct Iter<'uniq> {
    ones: IterOnes<'uniq>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.ones.next()?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
