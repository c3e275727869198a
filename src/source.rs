use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of candidate values for [`UniqueRand`].
///
/// Given a positive `bound`, an implementation returns a value in
/// `[0, bound)`. It is free to be non-uniform or even constant: the allocator
/// stays correct under any source and only loses speed when candidates keep
/// colliding. Values `>= bound` break the contract; the allocator treats them
/// as collisions.
///
/// Every `FnMut(usize) -> usize` closure is a source:
/// ```
/// use unique_rand::RandomSource;
///
/// let mut always_zero = |_bound: usize| 0;
/// assert_eq!(always_zero.next_below(10), 0);
/// ```
///
/// [`UniqueRand`]: crate::UniqueRand
pub trait RandomSource {
    /// Returns a value in `[0, bound)`. `bound` is never zero.
    fn next_below(&mut self, bound: usize) -> usize;
}

impl<F> RandomSource for F
where
    F: FnMut(usize) -> usize,
{
    #[inline]
    fn next_below(&mut self, bound: usize) -> usize {
        self(bound)
    }
}

/// Adapts any [`rand::Rng`] into a [`RandomSource`] drawing uniformly from
/// `[0, bound)`.
///
/// # Examples
/// ```
/// use unique_rand::{RandomSource, RngSource};
///
/// let mut a = RngSource::seeded(7);
/// let mut b = RngSource::seeded(7);
/// let v = a.next_below(100);
/// assert!(v < 100);
/// assert_eq!(v, b.next_below(100));
/// ```
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    /// Wraps the given generator.
    pub fn new(rng: R) -> Self {
        Self(rng)
    }

    /// Returns the wrapped generator.
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl RngSource<StdRng> {
    /// A [`StdRng`] seeded from operating system entropy. This is the source
    /// an allocator uses when none is configured.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// A [`StdRng`] with a fixed seed, producing a reproducible sequence.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    #[inline]
    fn next_below(&mut self, bound: usize) -> usize {
        self.0.gen_range(0..bound)
    }
}

pub(crate) type BoxedSource = Box<dyn RandomSource + Send>;

pub(crate) fn default_source() -> BoxedSource {
    Box::new(RngSource::from_entropy())
}
