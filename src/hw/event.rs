// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-to-main-loop signalling.
//!
//! Flags and counters live in `static`s: the interrupt handler writes, the main loop polls. Each is
//! a single atomic access, so no critical section is needed on Cortex-M3. Received bytes go
//! through a `heapless` single-producer single-consumer queue.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use heapless::spsc::Consumer;
use heapless::Vec;

/// A latched event, e.g. "button pressed".
pub struct EventFlag(AtomicBool);

impl EventFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[inline]
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether it was set.
    #[inline]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for EventFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Free-running count of timer periods.
pub struct TickCounter(AtomicU32);

impl TickCounter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    #[inline]
    pub fn tick(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn now(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Ticks since `since`, correct across wrap-around.
    #[inline]
    pub fn elapsed(&self, since: u32) -> u32 {
        self.now().wrapping_sub(since)
    }

    /// True once `ticks` have passed since `since`.
    pub fn expired(&self, since: u32, ticks: u32) -> bool {
        self.elapsed(since) >= ticks
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Groups bytes queued by a receive interrupt into blocks of `B`.
///
/// The interrupt handler owns the [`Producer`](heapless::spsc::Producer) end of the queue and only
/// enqueues. Bytes that arrive while a block is being handed out stay queued for the next block.
pub struct BlockCollector<'a, const Q: usize, const B: usize> {
    rx: Consumer<'a, u8, Q>,
    block: Vec<u8, B>,
}

impl<'a, const Q: usize, const B: usize> BlockCollector<'a, Q, B> {
    pub fn new(rx: Consumer<'a, u8, Q>) -> Self {
        Self {
            rx,
            block: Vec::new(),
        }
    }

    /// Move queued bytes into the current block and return it once it is full.
    pub fn poll(&mut self) -> Option<Vec<u8, B>> {
        while !self.block.is_full() {
            let byte = self.rx.dequeue()?;
            let _ = self.block.push(byte);
        }
        Some(core::mem::take(&mut self.block))
    }

    /// Bytes collected towards the next block.
    #[inline]
    pub fn pending(&self) -> usize {
        self.block.len()
    }
}
