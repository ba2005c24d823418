// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! LIN 2.x frame primitives.
//!
//! A LIN frame is a header sent by the master (break, sync `0x55`, protected identifier) followed
//! by a response of 1 to 8 data bytes and a checksum, sent by whichever node publishes the frame.

/// Sync field that follows every break.
pub const SYNC_BYTE: u8 = 0x55;

/// Byte sent after a break to wake a sleeping cluster.
pub const WAKEUP_BYTE: u8 = 0x80;

/// Diagnostic master request frame identifier.
pub const MASTER_REQUEST_ID: u8 = 0x3C;

/// Diagnostic slave response frame identifier.
pub const SLAVE_RESPONSE_ID: u8 = 0x3D;

/// Payload of the go-to-sleep command, carried in a master request frame.
pub const GO_TO_SLEEP: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

/// Largest response payload.
pub const MAX_DATA_LEN: usize = 8;

/// Error type for frame encoding.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Frame identifier above 0x3F.
    InvalidId(u8),
    /// Parity bits of a received PID do not match its identifier.
    Parity(u8),
    /// Response must carry 1 to 8 bytes.
    DataLength(usize),
}

/// Protected identifier: 6-bit frame id plus two parity bits.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pid(u8);

impl Pid {
    /// Build the protected identifier for frame id `id` (0..=0x3F).
    pub fn from_id(id: u8) -> Result<Self, Error> {
        if id > 0x3F {
            return Err(Error::InvalidId(id));
        }
        Ok(Self(id | parity_bits(id)))
    }

    /// Validate a PID byte as received from the bus.
    pub fn from_raw(raw: u8) -> Result<Self, Error> {
        let id = raw & 0x3F;
        if parity_bits(id) != raw & 0xC0 {
            return Err(Error::Parity(raw));
        }
        Ok(Self(raw))
    }

    /// Frame identifier without parity.
    #[inline]
    pub fn id(&self) -> u8 {
        self.0 & 0x3F
    }

    /// Byte as transmitted on the bus.
    #[inline]
    pub fn raw(&self) -> u8 {
        self.0
    }

    /// Diagnostic frames (0x3C, 0x3D) always use the classic checksum.
    #[inline]
    pub fn is_diagnostic(&self) -> bool {
        matches!(self.id(), MASTER_REQUEST_ID | SLAVE_RESPONSE_ID)
    }
}

/// P0 = ID0 ^ ID1 ^ ID2 ^ ID4, P1 = !(ID1 ^ ID3 ^ ID4 ^ ID5)
fn parity_bits(id: u8) -> u8 {
    let bit = |n: u8| (id >> n) & 0x01;
    let p0 = bit(0) ^ bit(1) ^ bit(2) ^ bit(4);
    let p1 = !(bit(1) ^ bit(3) ^ bit(4) ^ bit(5)) & 0x01;
    (p1 << 7) | (p0 << 6)
}

/// Checksum flavor of a frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChecksumModel {
    /// LIN 1.x: data bytes only.
    Classic,
    /// LIN 2.x: PID and data bytes.
    Enhanced,
}

/// Inverted 8-bit sum with end-around carry.
pub fn checksum(model: ChecksumModel, pid: Pid, data: &[u8]) -> u8 {
    let mut sum: u16 = match model {
        ChecksumModel::Enhanced if !pid.is_diagnostic() => pid.raw() as u16,
        _ => 0,
    };

    for &b in data {
        sum += b as u16;
        if sum > 0xFF {
            sum -= 0xFF;
        }
    }

    !(sum as u8)
}

/// Write `data` followed by its checksum into `out`. Returns the number of bytes written.
pub fn encode_response(
    model: ChecksumModel,
    pid: Pid,
    data: &[u8],
    out: &mut [u8; MAX_DATA_LEN + 1],
) -> Result<usize, Error> {
    if data.is_empty() || data.len() > MAX_DATA_LEN {
        return Err(Error::DataLength(data.len()));
    }

    out[..data.len()].copy_from_slice(data);
    out[data.len()] = checksum(model, pid, data);
    Ok(data.len() + 1)
}
