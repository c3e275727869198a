use core::fmt::{Debug, Formatter};
use core::iter::FusedIterator;

/// Number of bits held by one storage block.
pub const BLOCK_BITS: usize = Block::BITS as usize;

/// Storage word of a [`BlockMap`].
pub type Block = u32;

/// Computes the number of blocks needed to store `bit_count` bits.
///
/// The first block is held inline, the rest live in the overflow sequence.
///
/// # Examples
/// ```
/// use unique_rand::block_count;
///
/// assert_eq!(block_count(0), 0);
/// assert_eq!(block_count(32), 1);
/// assert_eq!(block_count(33), 2);
/// assert_eq!(block_count(100), 4);
/// ```
pub const fn block_count(bit_count: usize) -> usize {
    bit_count.div_ceil(BLOCK_BITS)
}

#[inline]
pub(crate) const fn overflow_len(bit_count: usize) -> usize {
    block_count(bit_count).saturating_sub(1)
}

/// A two-tier bitmap: one inline primary block plus a heap-allocated overflow
/// sequence of blocks of the same width.
///
/// Bit `idx` lives in block `idx / 32` at offset `idx % 32`. Block `0` is the
/// primary block, so bitmaps of up to 32 bits never allocate.
///
/// The capacity is always a whole number of blocks and only changes through
/// [`reset`].
///
/// # Examples
/// ```
/// use unique_rand::BlockMap;
///
/// let mut bm = BlockMap::with_capacity(40);
/// assert_eq!(bm.capacity(), 64);
/// bm.set(35);
/// assert!(bm.is_set(35));
/// assert_eq!(bm.popcount(), 1);
/// ```
///
/// [`reset`]: BlockMap::reset
#[derive(PartialEq, Eq, Hash, Clone, Default)]
pub struct BlockMap {
    primary: Block,
    overflow: Vec<Block>,
}

impl BlockMap {
    /// Creates a bitmap with all bits unset, large enough to hold `bit_count`
    /// bits.
    ///
    /// # Examples
    /// ```
    /// use unique_rand::BlockMap;
    ///
    /// assert_eq!(BlockMap::with_capacity(0).capacity(), 32);
    /// assert_eq!(BlockMap::with_capacity(32).capacity(), 32);
    /// assert_eq!(BlockMap::with_capacity(33).capacity(), 64);
    /// ```
    pub fn with_capacity(bit_count: usize) -> Self {
        Self {
            primary: 0,
            overflow: vec![0; overflow_len(bit_count)],
        }
    }

    /// Returns the number of addressable bits.
    #[inline]
    pub fn capacity(&self) -> usize {
        (self.overflow.len() + 1) * BLOCK_BITS
    }

    /// Unsets every bit and resizes the overflow sequence to exactly cover
    /// `bit_count` bits.
    ///
    /// # Examples
    /// ```
    /// use unique_rand::BlockMap;
    ///
    /// let mut bm = BlockMap::with_capacity(100);
    /// bm.set(70);
    /// bm.reset(10);
    /// assert_eq!(bm.capacity(), 32);
    /// assert_eq!(bm.popcount(), 0);
    /// ```
    pub fn reset(&mut self, bit_count: usize) {
        self.primary = 0;
        self.overflow.clear();
        self.overflow.resize(overflow_len(bit_count), 0);
    }

    /// Unsets every bit, keeping the capacity.
    pub fn clear(&mut self) {
        self.primary = 0;
        self.overflow.fill(0);
    }

    /// Returns the block index, the current content of that block and the
    /// single-bit mask selecting `idx` inside it.
    ///
    /// # Panics
    /// Panics if `idx >= self.capacity()`.
    ///
    /// # Examples
    /// ```
    /// use unique_rand::BlockMap;
    ///
    /// let mut bm = BlockMap::with_capacity(64);
    /// bm.set(33);
    /// assert_eq!(bm.locate(33), (1, 0b10, 0b10));
    /// assert_eq!(bm.locate(3), (0, 0, 0b1000));
    /// ```
    #[inline]
    pub fn locate(&self, idx: usize) -> (usize, Block, Block) {
        let (block_idx, item_idx) = Self::idxs(idx);
        (block_idx, self.block(block_idx), 1 << item_idx)
    }

    /// Returns `true` if the bit at the given index is set.
    ///
    /// # Panics
    /// Panics if `idx >= self.capacity()`.
    #[inline]
    pub fn is_set(&self, idx: usize) -> bool {
        let (_, word, mask) = self.locate(idx);
        word & mask != 0
    }

    /// Sets the bit at the given index.
    ///
    /// # Panics
    /// Panics if `idx >= self.capacity()`.
    #[inline]
    pub fn set(&mut self, idx: usize) {
        let (block_idx, item_idx) = Self::idxs(idx);
        *self.block_mut(block_idx) |= 1 << item_idx;
    }

    /// Unsets the bit at the given index.
    ///
    /// # Panics
    /// Panics if `idx >= self.capacity()`.
    #[inline]
    pub fn unset(&mut self, idx: usize) {
        let (block_idx, item_idx) = Self::idxs(idx);
        *self.block_mut(block_idx) &= !(1 << item_idx);
    }

    /// Returns the index of the lowest unset bit, or `None` if every bit up to
    /// the capacity is set.
    ///
    /// The result may lie beyond the bit count the bitmap was sized for,
    /// since the last block is usually only partially used. Runs in O(b)
    /// where b is the block count.
    ///
    /// # Examples
    /// ```
    /// use unique_rand::BlockMap;
    ///
    /// let mut bm = BlockMap::with_capacity(64);
    /// for i in 0..33 {
    ///     bm.set(i);
    /// }
    /// bm.unset(7);
    /// assert_eq!(bm.first_unset(), Some(7));
    /// bm.set(7);
    /// assert_eq!(bm.first_unset(), Some(33));
    /// ```
    pub fn first_unset(&self) -> Option<usize> {
        self.blocks()
            .enumerate()
            .find_map(|(block_idx, block)| {
                let base = block_idx * BLOCK_BITS;
                match block {
                    // empty block, bit 0 is free
                    0 => Some(base),
                    Block::MAX => None,
                    _ => Some(base + block.trailing_ones() as usize),
                }
            })
    }

    /// Returns the number of set bits.
    #[inline]
    pub fn popcount(&self) -> usize {
        self.blocks().map(|b| b.count_ones() as usize).sum()
    }

    /// Returns an iterator over the indices of all set bits, in ascending
    /// order.
    ///
    /// # Examples
    /// ```
    /// use unique_rand::BlockMap;
    ///
    /// let mut bm = BlockMap::with_capacity(70);
    /// bm.set(65);
    /// bm.set(2);
    /// bm.set(40);
    /// assert_eq!(bm.iter_ones().collect::<Vec<_>>(), vec![2, 40, 65]);
    /// ```
    pub fn iter_ones(&self) -> IterOnes<'_> {
        IterOnes {
            bitmap: self,
            block_idx: 0,
            current: self.primary,
            base_bit_idx: 0,
        }
    }

    #[inline]
    fn idxs(idx: usize) -> (usize, usize) {
        (idx / BLOCK_BITS, idx % BLOCK_BITS)
    }

    #[inline]
    fn block(&self, block_idx: usize) -> Block {
        match block_idx {
            0 => self.primary,
            n => self.overflow[n - 1],
        }
    }

    #[inline]
    fn block_mut(&mut self, block_idx: usize) -> &mut Block {
        match block_idx {
            0 => &mut self.primary,
            n => &mut self.overflow[n - 1],
        }
    }

    #[inline]
    fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        core::iter::once(self.primary).chain(self.overflow.iter().copied())
    }

    #[inline]
    fn block_count(&self) -> usize {
        self.overflow.len() + 1
    }
}

impl Debug for BlockMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "LSB -> ")?;
        for (block_idx, block) in self.blocks().enumerate() {
            if block_idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}: ", block_idx * BLOCK_BITS)?;
            for bit in 0..BLOCK_BITS {
                write!(f, "{}", if block & 1 << bit != 0 { '1' } else { '0' })?;
                if bit % 8 == 7 && bit < BLOCK_BITS - 1 {
                    write!(f, "_")?;
                }
            }
        }
        write!(f, " <- MSB")?;
        Ok(())
    }
}

/// Iterator over the indices of set bits in a [`BlockMap`].
///
/// Yields the positions of all bits that are set, in ascending order.
///
/// Returned by [`BlockMap::iter_ones()`].
#[derive(Clone, Copy)]
pub struct IterOnes<'bitmap> {
    bitmap: &'bitmap BlockMap,
    block_idx: usize,
    current: Block,
    base_bit_idx: usize,
}

impl Iterator for IterOnes<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        while self.block_idx < self.bitmap.block_count() {
            if self.current != 0 {
                let tz = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1; // unset LSB
                return Some(self.base_bit_idx + tz);
            }

            self.block_idx += 1;
            self.base_bit_idx += BLOCK_BITS;
            if self.block_idx < self.bitmap.block_count() {
                self.current = self.bitmap.block(self.block_idx);
            }
        }
        None
    }
}

impl FusedIterator for IterOnes<'_> {}
