//! Bit cursor bookkeeping shared by the blocking and suspending adapters.
//!
//! The cursors never touch a stream. Readers fetch bytes and hand them to
//! [`ReadCursor::load`]; writers take completed bytes from
//! [`WriteCursor::completed`] and write them.

use crate::bits::Bits;
use crate::order::BitOrder;
use std::collections::VecDeque;

/// Unpacking state of a bit reader.
///
/// Unconsumed bits are the `pushback` queue followed by the last `remaining`
/// bits of `current`. Together they always end on a byte boundary. Multi-bit
/// reads fetch until enough bits are buffered and only then take them, so an
/// interrupted read leaves every fetched bit in place.
#[derive(Debug)]
pub(crate) struct ReadCursor {
    order: BitOrder,
    current: u8,
    remaining: u8,
    pushback: VecDeque<bool>,
    finished: bool,
    bits_read: u64,
}

impl ReadCursor {
    pub(crate) fn new(order: BitOrder) -> Self {
        Self {
            order,
            current: 0,
            remaining: 0,
            pushback: VecDeque::new(),
            finished: false,
            bits_read: 0,
        }
    }

    #[inline]
    pub(crate) fn order(&self) -> BitOrder {
        self.order
    }

    #[inline]
    pub(crate) fn bits_read(&self) -> u64 {
        self.bits_read
    }

    /// Next bit without fetching, if one is buffered.
    #[inline]
    pub(crate) fn next_buffered(&mut self) -> Option<bool> {
        let bit = match self.pushback.pop_front() {
            Some(bit) => bit,
            None if self.remaining > 0 => {
                let bit = self.order.bit_at(self.current, 8 - self.remaining);
                self.remaining -= 1;
                bit
            }
            None => return None,
        };
        self.bits_read += 1;
        Some(bit)
    }

    /// Number of bits available without fetching.
    #[inline]
    pub(crate) fn buffered(&self) -> usize {
        self.pushback.len() + self.remaining as usize
    }

    /// Whether the end of the underlying stream has been seen.
    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        self.finished
    }

    /// Whether no bit is buffered and the end has been seen.
    pub(crate) fn is_finished(&self) -> bool {
        self.finished && self.buffered() == 0
    }

    /// Queue a fetched byte behind the bits already buffered.
    pub(crate) fn load(&mut self, byte: u8) {
        while self.remaining > 0 {
            let bit = self.order.bit_at(self.current, 8 - self.remaining);
            self.remaining -= 1;
            self.pushback.push_back(bit);
        }
        self.current = byte;
        self.remaining = 8;
    }

    pub(crate) fn mark_finished(&mut self) {
        self.finished = true;
    }

    /// Take `count` buffered bits, or nothing if fewer are buffered.
    pub(crate) fn take(&mut self, count: usize) -> Option<Bits> {
        if self.buffered() < count {
            return None;
        }
        Some((0..count).filter_map(|_| self.next_buffered()).collect())
    }

    /// Drop every buffered bit, counting them as read.
    pub(crate) fn discard(&mut self) {
        self.bits_read += self.buffered() as u64;
        self.clear();
    }

    /// Skip to the next byte boundary, returning the number of bits skipped.
    pub(crate) fn align(&mut self) -> usize {
        let skip = self.buffered() % 8;
        for _ in 0..skip {
            if self.pushback.pop_front().is_none() {
                self.remaining -= 1;
            }
        }
        self.bits_read += skip as u64;
        skip
    }

    pub(crate) fn clear(&mut self) {
        self.pushback = VecDeque::new();
        self.remaining = 0;
    }
}

/// Packing state of a bit writer.
///
/// Invariant: `filled <= 8`. A full accumulator is waiting for a byte write
/// that has not succeeded yet.
#[derive(Debug)]
pub(crate) struct WriteCursor {
    order: BitOrder,
    fill: bool,
    current: u8,
    filled: u8,
    bits_written: u64,
}

impl WriteCursor {
    pub(crate) fn new(order: BitOrder, fill: bool) -> Self {
        Self {
            order,
            fill,
            current: 0,
            filled: 0,
            bits_written: 0,
        }
    }

    #[inline]
    pub(crate) fn order(&self) -> BitOrder {
        self.order
    }

    #[inline]
    pub(crate) fn fill(&self) -> bool {
        self.fill
    }

    pub(crate) fn set_fill(&mut self, fill: bool) {
        self.fill = fill;
    }

    #[inline]
    pub(crate) fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Number of bits waiting in the accumulator.
    #[inline]
    pub(crate) fn pending_bits(&self) -> u8 {
        self.filled
    }

    /// The completed byte, if the accumulator is full.
    #[inline]
    pub(crate) fn completed(&self) -> Option<u8> {
        (self.filled == 8).then_some(self.current)
    }

    /// Record that the completed byte was written.
    #[inline]
    pub(crate) fn reset(&mut self) {
        self.current = 0;
        self.filled = 0;
    }

    /// Add a bit to a non-full accumulator.
    #[inline]
    pub(crate) fn push(&mut self, bit: bool) {
        debug_assert!(self.filled < 8);
        self.current |= self.order.place(bit, self.filled);
        self.filled += 1;
        self.bits_written += 1;
    }

    /// Complete a partial byte with the fill bit. Padding is not counted in
    /// [`WriteCursor::bits_written`].
    pub(crate) fn pad(&mut self) {
        if self.filled == 0 {
            return;
        }
        while self.filled < 8 {
            self.current |= self.order.place(self.fill, self.filled);
            self.filled += 1;
        }
    }
}
