// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! bxCAN bit timing.
//!
//! A bit is split into time quanta: one sync quantum, `bs1` quanta before the sample point and
//! `bs2` after it. The quantum length is the APB1 clock divided by the prescaler.

/// Sample point targeted by [`BitTiming::compute`], in permille of the bit time.
pub const TARGET_SAMPLE_POINT: u32 = 875;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A segment or the prescaler is outside what the BTR register can hold.
    OutOfRange,
    /// No prescaler/segment combination hits the bitrate exactly.
    NoSolution { pclk: u32, bitrate: u32 },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BitTiming {
    prescaler: u16,
    sjw: u8,
    bs1: u8,
    bs2: u8,
}

impl BitTiming {
    pub fn new(prescaler: u16, sjw: u8, bs1: u8, bs2: u8) -> Result<Self, Error> {
        let ok = (1..=1024).contains(&prescaler)
            && (1..=4).contains(&sjw)
            && (1..=16).contains(&bs1)
            && (1..=8).contains(&bs2);
        if !ok {
            return Err(Error::OutOfRange);
        }
        Ok(Self {
            prescaler,
            sjw,
            bs1,
            bs2,
        })
    }

    /// Find the timing for `bitrate` at peripheral clock `pclk`.
    ///
    /// Searches 8 to 25 quanta per bit and keeps the split whose sample point is nearest 87.5 %.
    /// On a tie the longer bit (finer quanta) wins.
    pub fn compute(pclk: u32, bitrate: u32) -> Result<Self, Error> {
        let no_solution = Error::NoSolution { pclk, bitrate };
        if bitrate == 0 || pclk % bitrate != 0 {
            return Err(no_solution);
        }
        let clocks_per_bit = pclk / bitrate;

        let mut best: Option<(u32, BitTiming)> = None;
        for tq in 8u32..=25 {
            if clocks_per_bit % tq != 0 {
                continue;
            }
            let prescaler = clocks_per_bit / tq;
            if prescaler > 1024 {
                continue;
            }

            for bs2 in 2u32..=8 {
                let Some(bs1) = (tq - 1).checked_sub(bs2) else {
                    continue;
                };
                if !(1..=16).contains(&bs1) {
                    continue;
                }
                let sp = (1 + bs1) * 1000 / tq;
                let dist = sp.abs_diff(TARGET_SAMPLE_POINT);

                if best.map_or(true, |(d, _)| dist <= d) {
                    let timing = BitTiming {
                        prescaler: prescaler as u16,
                        sjw: 1,
                        bs1: bs1 as u8,
                        bs2: bs2 as u8,
                    };
                    best = Some((dist, timing));
                }
            }
        }

        best.map(|(_, t)| t).ok_or(no_solution)
    }

    /// Value for the CAN_BTR register (normal mode, no loopback or silent bits).
    pub fn btr(&self) -> u32 {
        ((self.sjw as u32 - 1) << 24)
            | ((self.bs2 as u32 - 1) << 20)
            | ((self.bs1 as u32 - 1) << 16)
            | (self.prescaler as u32 - 1)
    }

    #[inline]
    pub fn quanta_per_bit(&self) -> u32 {
        1 + self.bs1 as u32 + self.bs2 as u32
    }

    pub fn bitrate(&self, pclk: u32) -> u32 {
        pclk / (self.prescaler as u32 * self.quanta_per_bit())
    }

    pub fn sample_point_permille(&self) -> u32 {
        (1 + self.bs1 as u32) * 1000 / self.quanta_per_bit()
    }

    #[inline]
    pub fn prescaler(&self) -> u16 {
        self.prescaler
    }

    #[inline]
    pub fn segments(&self) -> (u8, u8, u8) {
        (self.sjw, self.bs1, self.bs2)
    }
}

/// Supported bus speeds, selectable at runtime.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Baudrate {
    Kbps125,
    Kbps250,
    Kbps500,
    Kbps1000,
}

impl Baudrate {
    pub const ALL: [Baudrate; 4] = [
        Baudrate::Kbps125,
        Baudrate::Kbps250,
        Baudrate::Kbps500,
        Baudrate::Kbps1000,
    ];

    pub fn kbps(self) -> u16 {
        match self {
            Baudrate::Kbps125 => 125,
            Baudrate::Kbps250 => 250,
            Baudrate::Kbps500 => 500,
            Baudrate::Kbps1000 => 1000,
        }
    }

    pub fn from_kbps(kbps: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.kbps() == kbps)
    }

    #[inline]
    pub fn bits_per_second(self) -> u32 {
        self.kbps() as u32 * 1000
    }
}
