// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte-at-a-time receiver for LIN frames.
//!
//! Feed every received byte into [`Parser::push`] and call [`Parser::on_break`] whenever the UART
//! reports a break. A slave uses the full header path (sync, PID, response); the master driver
//! skips the header it sent itself and arms the parser with [`Parser::begin_response`].

use crate::protocol::lin::{checksum, ChecksumModel, Pid, MAX_DATA_LEN, SYNC_BYTE};

/// Something worth reporting from the byte stream.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// A valid header was received.
    Header(Pid),
    /// A complete response with a correct checksum.
    Response {
        pid: Pid,
        data: [u8; MAX_DATA_LEN],
        len: u8,
    },
    Error(SlaveError),
}

/// Reception errors, named after the LIN slave error classes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SlaveError {
    /// Byte after the break was not 0x55.
    Sync(u8),
    /// PID parity mismatch.
    Parity(u8),
    /// Response checksum mismatch.
    Checksum(Pid),
}

#[derive(Copy, Clone)]
enum State {
    Idle,
    WaitSync,
    WaitPid,
    Data {
        pid: Pid,
        len: u8,
        idx: u8,
        model: ChecksumModel,
    },
    Checksum {
        pid: Pid,
        len: u8,
        model: ChecksumModel,
    },
}

pub struct Parser {
    state: State,
    buf: [u8; MAX_DATA_LEN],
    /// Response layout per frame id, for frames this node listens to.
    responses: [Option<(u8, ChecksumModel)>; 64],
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            buf: [0; MAX_DATA_LEN],
            responses: [None; 64],
        }
    }

    /// Listen for a response of `len` bytes after every header with frame id `id`.
    pub fn expect_response(&mut self, id: u8, len: u8, model: ChecksumModel) {
        if let Some(slot) = self.responses.get_mut(id as usize) {
            *slot = if (1..=MAX_DATA_LEN as u8).contains(&len) {
                Some((len, model))
            } else {
                None
            };
        }
    }

    /// A break was detected: any frame in progress is abandoned.
    pub fn on_break(&mut self) {
        self.state = State::WaitSync;
    }

    /// Start collecting a response directly, without parsing a header first.
    pub fn begin_response(&mut self, pid: Pid, len: u8, model: ChecksumModel) {
        let len = len.clamp(1, MAX_DATA_LEN as u8);
        self.state = State::Data {
            pid,
            len,
            idx: 0,
            model,
        };
    }

    /// Drop any frame in progress.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    /// Number of response bytes (data and checksum) received for the frame in progress.
    pub fn response_progress(&self) -> usize {
        match self.state {
            State::Data { idx, .. } => idx as usize,
            State::Checksum { len, .. } => len as usize,
            _ => 0,
        }
    }

    /// True while a response is being collected.
    pub fn in_response(&self) -> bool {
        matches!(self.state, State::Data { .. } | State::Checksum { .. })
    }

    /// Process a single incoming byte. Returns an [`Event`] when something completes or fails.
    pub fn push(&mut self, byte: u8) -> Option<Event> {
        match self.state {
            State::Idle => {}
            State::WaitSync => {
                if byte == SYNC_BYTE {
                    self.state = State::WaitPid;
                } else {
                    self.state = State::Idle;
                    return Some(Event::Error(SlaveError::Sync(byte)));
                }
            }
            State::WaitPid => {
                let pid = match Pid::from_raw(byte) {
                    Ok(pid) => pid,
                    Err(_) => {
                        self.state = State::Idle;
                        return Some(Event::Error(SlaveError::Parity(byte)));
                    }
                };

                self.state = match self.responses[pid.id() as usize] {
                    Some((len, model)) => State::Data {
                        pid,
                        len,
                        idx: 0,
                        model,
                    },
                    // Not a frame for us, wait for the next break.
                    None => State::Idle,
                };
                return Some(Event::Header(pid));
            }
            State::Data {
                pid,
                len,
                idx,
                model,
            } => {
                self.buf[idx as usize] = byte;
                let idx = idx + 1;
                self.state = if idx == len {
                    State::Checksum { pid, len, model }
                } else {
                    State::Data {
                        pid,
                        len,
                        idx,
                        model,
                    }
                };
            }
            State::Checksum { pid, len, model } => {
                self.state = State::Idle;

                let data = &self.buf[..len as usize];
                if byte != checksum(model, pid, data) {
                    return Some(Event::Error(SlaveError::Checksum(pid)));
                }
                return Some(Event::Response {
                    pid,
                    data: self.buf,
                    len,
                });
            }
        }
        None
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
