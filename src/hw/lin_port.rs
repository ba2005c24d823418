// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Half-duplex LIN port: the [`LinHw`] for [`crate::mcal::Lin`].
//!
//! The transceiver is single-wire, so everything the master sends comes back on RX. The UART's
//! receive register holds a single byte, which is why the receive interrupt moves every byte into
//! an [`RxQueue`] through an [`RxFeed`] as soon as it lands. [`LinPort`] consumes that queue at its
//! own pace and drops the echoes of its own transmissions, leaving only the slaves' traffic.

use heapless::spsc::{Consumer, Producer, Queue};
use heapless::Deque;

use crate::mcal::lin::{LinHw, RxByte};

pub const RX_QUEUE_LEN: usize = 32;
/// Transmitted bytes whose echo may still be outstanding.
const ECHO_DEPTH: usize = 16;

pub type RxQueue = Queue<RxEvent, RX_QUEUE_LEN>;

/// What the receive interrupt saw.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RxEvent {
    /// LIN break detected.
    Break,
    Data(u8),
    /// Byte received with a framing error.
    Framing(u8),
    /// Bytes were lost, in the UART or because the queue was full.
    Overrun,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The transmitter did not become ready.
    Timeout,
    Overrun,
    Framing,
    /// The echo of a transmitted byte did not match what was sent.
    Readback { sent: u8, got: u8 },
}

/// Transmit side of a UART in LIN mode.
pub trait LinTransmit {
    /// Configure the UART and enable its receive interrupt.
    fn enable(&mut self, baudrate: u32);
    fn send_break(&mut self) -> Result<(), Error>;
    fn write(&mut self, byte: u8) -> Result<(), Error>;
}

/// Interrupt end of the receive queue.
pub struct RxFeed<'a> {
    queue: Producer<'a, RxEvent, RX_QUEUE_LEN>,
    lost: bool,
}

impl<'a> RxFeed<'a> {
    pub fn new(queue: Producer<'a, RxEvent, RX_QUEUE_LEN>) -> Self {
        Self { queue, lost: false }
    }

    /// Queue an event. When the queue is full the event is dropped and an `Overrun` is queued
    /// ahead of the next one that fits.
    pub fn push(&mut self, event: RxEvent) {
        if self.lost {
            if self.queue.enqueue(RxEvent::Overrun).is_err() {
                return;
            }
            self.lost = false;
        }
        if self.queue.enqueue(event).is_err() {
            self.lost = true;
        }
    }
}

pub struct LinPort<'a, T: LinTransmit> {
    tx: T,
    rx: Consumer<'a, RxEvent, RX_QUEUE_LEN>,
    echo: Deque<u8, ECHO_DEPTH>,
    break_echo: bool,
}

impl<'a, T: LinTransmit> LinPort<'a, T> {
    pub fn new(tx: T, rx: Consumer<'a, RxEvent, RX_QUEUE_LEN>) -> Self {
        Self {
            tx,
            rx,
            echo: Deque::new(),
            break_echo: false,
        }
    }

    pub fn transmitter(&mut self) -> &mut T {
        &mut self.tx
    }

    fn expect_echo(&mut self, byte: u8) {
        if self.echo.is_full() {
            self.echo.pop_front();
        }
        let _ = self.echo.push_back(byte);
    }
}

impl<'a, T: LinTransmit> LinHw for LinPort<'a, T> {
    type Error = Error;

    fn enable(&mut self, _ch: u8, baudrate: u32) {
        self.tx.enable(baudrate);
        while self.rx.dequeue().is_some() {}
        self.echo.clear();
        self.break_echo = false;
    }

    fn send_break(&mut self, _ch: u8) -> Result<(), Error> {
        self.tx.send_break()?;
        self.break_echo = true;
        Ok(())
    }

    fn write(&mut self, _ch: u8, byte: u8) -> Result<(), Error> {
        self.tx.write(byte)?;
        self.expect_echo(byte);
        Ok(())
    }

    fn read(&mut self, _ch: u8) -> nb::Result<RxByte, Error> {
        loop {
            let event = self.rx.dequeue().ok_or(nb::Error::WouldBlock)?;
            match event {
                RxEvent::Break => {
                    if core::mem::take(&mut self.break_echo) {
                        continue;
                    }
                    return Ok(RxByte::Break);
                }
                // The 0x00 with a framing error that accompanies every break.
                RxEvent::Framing(0) => continue,
                RxEvent::Framing(_) => return Err(nb::Error::Other(Error::Framing)),
                RxEvent::Overrun => {
                    self.echo.clear();
                    return Err(nb::Error::Other(Error::Overrun));
                }
                RxEvent::Data(byte) => match self.echo.pop_front() {
                    Some(sent) if sent == byte => continue,
                    Some(sent) => {
                        return Err(nb::Error::Other(Error::Readback { sent, got: byte }))
                    }
                    None => return Ok(RxByte::Data(byte)),
                },
            }
        }
    }

    fn wakeup_detected(&mut self, ch: u8) -> bool {
        let mut seen = false;
        loop {
            match self.read(ch) {
                Ok(_) | Err(nb::Error::Other(_)) => seen = true,
                Err(nb::Error::WouldBlock) => return seen,
            }
        }
    }
}
