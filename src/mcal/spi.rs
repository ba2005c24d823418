// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SPI handler/driver.
//!
//! Data moves through three configured layers:
//! - a **channel** is a buffer of bytes shifted out (and replaced by what is shifted in),
//! - a **job** is an ordered list of channels sent on one hardware unit under one chip select,
//! - a **sequence** is an ordered list of jobs.
//!
//! Sequences are sent either synchronously ([`Spi::sync_transmit`]) or queued with
//! [`Spi::async_transmit`] and advanced one job per call to [`Spi::main_function_handling`].

use core::fmt::Debug;

use crate::mcal::cfg;
use crate::mcal::std_types::VersionInfo;

pub type ChannelId = u8;
pub type JobId = u8;
pub type SequenceId = u8;
pub type HwUnit = u8;

pub const MAX_CHANNELS: usize = 8;
pub const MAX_JOBS: usize = 8;
pub const MAX_SEQUENCES: usize = 8;
/// Largest channel buffer in bytes.
pub const CHANNEL_CAPACITY: usize = 32;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BufferKind {
    /// Fixed-length buffer filled with `write_ib`.
    Internal,
    /// Variable-length buffer set up per transfer with `setup_eb`.
    External,
}

#[derive(Copy, Clone, Debug)]
pub struct ChannelConfig {
    pub buffer: BufferKind,
    /// Transfer length for internal buffers, upper bound for external ones.
    pub len: u16,
    /// Byte sent where no data was provided.
    pub default_data: u8,
}

#[derive(Copy, Clone, Debug)]
pub struct JobConfig {
    pub hw_unit: HwUnit,
    pub cs: u8,
    pub channels: &'static [ChannelId],
}

#[derive(Copy, Clone, Debug)]
pub struct SequenceConfig {
    pub jobs: &'static [JobId],
}

#[derive(Copy, Clone, Debug)]
pub struct SpiConfig {
    pub channels: &'static [ChannelConfig],
    pub jobs: &'static [JobConfig],
    pub sequences: &'static [SequenceConfig],
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    Uninit,
    Idle,
    Busy,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JobResult {
    Ok,
    Pending,
    Failed,
    Queued,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SeqResult {
    Ok,
    Pending,
    Failed,
    Canceled,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AsyncMode {
    /// Jobs advance only from `main_function_handling`.
    Polling,
    /// The first job starts right away; completion interrupts call `main_function_handling`.
    Interrupt,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    Uninit,
    AlreadyInit,
    /// Configuration exceeds the driver's tables or references unknown ids.
    Config,
    InvalidChannel(ChannelId),
    InvalidJob(JobId),
    InvalidSequence(SequenceId),
    /// No configured job runs on this hardware unit.
    InvalidUnit(HwUnit),
    /// Internal buffer call on an external channel or the reverse.
    BufferKind(ChannelId),
    Length,
    /// The sequence, or one sharing a job with it, is still pending.
    SeqPending(SequenceId),
    Busy,
    JobFailed(JobId),
}

/// Hardware side of the driver: one or more SPI peripherals with their chip selects.
pub trait SpiHw {
    type Error: Debug;

    fn select(&mut self, unit: HwUnit, cs: u8);
    fn deselect(&mut self, unit: HwUnit, cs: u8);
    /// Full-duplex transfer; received bytes replace `buf`.
    fn transfer(&mut self, unit: HwUnit, buf: &mut [u8]) -> Result<(), Self::Error>;

    fn is_busy(&self, _unit: HwUnit) -> bool {
        false
    }
}

#[derive(Copy, Clone)]
struct ChannelBuf {
    data: [u8; CHANNEL_CAPACITY],
    len: u16,
}

pub struct Spi<H: SpiHw> {
    hw: H,
    config: Option<&'static SpiConfig>,
    mode: AsyncMode,

    buffers: [ChannelBuf; MAX_CHANNELS],
    job_results: [JobResult; MAX_JOBS],
    seq_results: [SeqResult; MAX_SEQUENCES],

    /// Jobs waiting for `main_function_handling`, oldest first.
    queue: [(JobId, SequenceId); MAX_JOBS],
    queued: usize,
}

impl<H: SpiHw> Spi<H> {
    pub fn new(hw: H) -> Self {
        Self {
            hw,
            config: None,
            mode: AsyncMode::Polling,
            buffers: [ChannelBuf {
                data: [0; CHANNEL_CAPACITY],
                len: 0,
            }; MAX_CHANNELS],
            job_results: [JobResult::Ok; MAX_JOBS],
            seq_results: [SeqResult::Ok; MAX_SEQUENCES],
            queue: [(0, 0); MAX_JOBS],
            queued: 0,
        }
    }

    pub fn init(&mut self, config: &'static SpiConfig) -> Result<(), Error> {
        if self.config.is_some() {
            return Err(Error::AlreadyInit);
        }
        validate(config)?;

        for (buf, ch) in self.buffers.iter_mut().zip(config.channels) {
            buf.data = [ch.default_data; CHANNEL_CAPACITY];
            buf.len = ch.len;
        }
        self.job_results = [JobResult::Ok; MAX_JOBS];
        self.seq_results = [SeqResult::Ok; MAX_SEQUENCES];
        self.queued = 0;
        self.mode = AsyncMode::Polling;
        self.config = Some(config);
        Ok(())
    }

    pub fn deinit(&mut self) -> Result<(), Error> {
        self.config()?;
        if self.queued > 0 {
            return Err(Error::Busy);
        }
        self.config = None;
        Ok(())
    }

    fn config(&self) -> Result<&'static SpiConfig, Error> {
        self.config.ok_or(Error::Uninit)
    }

    fn channel(&self, ch: ChannelId, kind: BufferKind) -> Result<ChannelConfig, Error> {
        let cfg = *self
            .config()?
            .channels
            .get(ch as usize)
            .ok_or(Error::InvalidChannel(ch))?;
        if cfg.buffer != kind {
            return Err(Error::BufferKind(ch));
        }
        Ok(cfg)
    }

    fn sequence(&self, seq: SequenceId) -> Result<&'static SequenceConfig, Error> {
        self.config()?
            .sequences
            .get(seq as usize)
            .ok_or(Error::InvalidSequence(seq))
    }

    /// Fill an internal buffer. Bytes past `data` are set to the channel's default value.
    pub fn write_ib(&mut self, ch: ChannelId, data: &[u8]) -> Result<(), Error> {
        let cfg = self.channel(ch, BufferKind::Internal)?;
        fill(&mut self.buffers[ch as usize], &cfg, data, cfg.len)
    }

    /// Copy the last received bytes of an internal buffer into `out`.
    pub fn read_ib(&self, ch: ChannelId, out: &mut [u8]) -> Result<usize, Error> {
        self.channel(ch, BufferKind::Internal)?;
        Ok(copy_out(&self.buffers[ch as usize], out))
    }

    /// Prepare an external buffer transfer of `len` bytes. Without `src` the default value is sent.
    pub fn setup_eb(&mut self, ch: ChannelId, src: Option<&[u8]>, len: u16) -> Result<(), Error> {
        let cfg = self.channel(ch, BufferKind::External)?;
        if len == 0 || len > cfg.len {
            return Err(Error::Length);
        }
        fill(&mut self.buffers[ch as usize], &cfg, src.unwrap_or(&[]), len)
    }

    pub fn read_eb(&self, ch: ChannelId, out: &mut [u8]) -> Result<usize, Error> {
        self.channel(ch, BufferKind::External)?;
        Ok(copy_out(&self.buffers[ch as usize], out))
    }

    /// Queue every job of `seq`.
    pub fn async_transmit(&mut self, seq: SequenceId) -> Result<(), Error> {
        let seq_cfg = self.sequence(seq)?;
        self.check_conflicts(seq, seq_cfg)?;

        for &job in seq_cfg.jobs {
            self.queue[self.queued] = (job, seq);
            self.queued += 1;
            self.job_results[job as usize] = JobResult::Queued;
        }
        self.seq_results[seq as usize] = SeqResult::Pending;

        if self.mode == AsyncMode::Interrupt {
            self.main_function_handling();
        }
        Ok(())
    }

    /// Send every job of `seq` before returning.
    pub fn sync_transmit(&mut self, seq: SequenceId) -> Result<(), Error> {
        let seq_cfg = self.sequence(seq)?;
        self.check_conflicts(seq, seq_cfg)?;

        self.seq_results[seq as usize] = SeqResult::Pending;
        for &job in seq_cfg.jobs {
            if !self.run_job(job) {
                self.seq_results[seq as usize] = SeqResult::Failed;
                return Err(Error::JobFailed(job));
            }
        }
        self.seq_results[seq as usize] = SeqResult::Ok;
        Ok(())
    }

    fn check_conflicts(&self, seq: SequenceId, seq_cfg: &SequenceConfig) -> Result<(), Error> {
        if self.seq_results[seq as usize] == SeqResult::Pending {
            return Err(Error::SeqPending(seq));
        }
        if let Some(&(_, other)) = self.queue[..self.queued]
            .iter()
            .find(|(job, _)| seq_cfg.jobs.contains(job))
        {
            return Err(Error::SeqPending(other));
        }
        Ok(())
    }

    /// Run the oldest queued job, if any.
    pub fn main_function_handling(&mut self) {
        if self.config.is_none() || self.queued == 0 {
            return;
        }

        let (job, seq) = self.queue[0];
        self.dequeue(0);

        if self.run_job(job) {
            let more = self.queue[..self.queued].iter().any(|&(_, s)| s == seq);
            if !more {
                self.seq_results[seq as usize] = SeqResult::Ok;
            }
        } else {
            self.seq_results[seq as usize] = SeqResult::Failed;
            self.drop_jobs_of(seq);
        }
    }

    /// Stop a pending sequence. The job already on the wire (if any) completes.
    pub fn cancel(&mut self, seq: SequenceId) -> Result<(), Error> {
        self.sequence(seq)?;
        if self.seq_results[seq as usize] == SeqResult::Pending {
            self.seq_results[seq as usize] = SeqResult::Canceled;
            self.drop_jobs_of(seq);
        }
        Ok(())
    }

    pub fn set_async_mode(&mut self, mode: AsyncMode) -> Result<(), Error> {
        self.config()?;
        if self.queued > 0 {
            return Err(Error::Busy);
        }
        self.mode = mode;
        Ok(())
    }

    pub fn get_status(&self) -> Status {
        match self.config {
            None => Status::Uninit,
            Some(_) if self.queued > 0 => Status::Busy,
            Some(_) => Status::Idle,
        }
    }

    pub fn get_job_result(&self, job: JobId) -> Result<JobResult, Error> {
        if job as usize >= self.config()?.jobs.len() {
            return Err(Error::InvalidJob(job));
        }
        Ok(self.job_results[job as usize])
    }

    pub fn get_sequence_result(&self, seq: SequenceId) -> Result<SeqResult, Error> {
        self.sequence(seq)?;
        Ok(self.seq_results[seq as usize])
    }

    pub fn get_hw_unit_status(&self, unit: HwUnit) -> Result<Status, Error> {
        let config = self.config()?;
        if !config.jobs.iter().any(|j| j.hw_unit == unit) {
            return Err(Error::InvalidUnit(unit));
        }
        let queued_on_unit = self.queue[..self.queued]
            .iter()
            .any(|&(job, _)| config.jobs[job as usize].hw_unit == unit);

        if queued_on_unit || self.hw.is_busy(unit) {
            Ok(Status::Busy)
        } else {
            Ok(Status::Idle)
        }
    }

    pub fn version_info(&self) -> VersionInfo {
        cfg::SPI_VERSION
    }

    pub fn hw(&mut self) -> &mut H {
        &mut self.hw
    }

    /// Send one job. Returns false if the hardware reported an error.
    fn run_job(&mut self, job: JobId) -> bool {
        let Some(config) = self.config else {
            return false;
        };
        let job_cfg = &config.jobs[job as usize];
        self.job_results[job as usize] = JobResult::Pending;

        self.hw.select(job_cfg.hw_unit, job_cfg.cs);
        let mut ok = true;
        for &ch in job_cfg.channels {
            let buf = &mut self.buffers[ch as usize];
            if self.hw.transfer(job_cfg.hw_unit, &mut buf.data[..buf.len as usize]).is_err() {
                ok = false;
                break;
            }
        }
        self.hw.deselect(job_cfg.hw_unit, job_cfg.cs);

        self.job_results[job as usize] = if ok { JobResult::Ok } else { JobResult::Failed };
        ok
    }

    fn dequeue(&mut self, idx: usize) {
        self.queue.copy_within(idx + 1..self.queued, idx);
        self.queued -= 1;
    }

    fn drop_jobs_of(&mut self, seq: SequenceId) {
        let mut i = 0;
        while i < self.queued {
            let (job, s) = self.queue[i];
            if s == seq {
                self.job_results[job as usize] = JobResult::Failed;
                self.dequeue(i);
            } else {
                i += 1;
            }
        }
    }
}

fn validate(config: &SpiConfig) -> Result<(), Error> {
    if config.channels.len() > MAX_CHANNELS
        || config.jobs.len() > MAX_JOBS
        || config.sequences.len() > MAX_SEQUENCES
    {
        return Err(Error::Config);
    }

    let channels_ok = config
        .channels
        .iter()
        .all(|ch| ch.len > 0 && ch.len as usize <= CHANNEL_CAPACITY);
    let jobs_ok = config.jobs.iter().all(|job| {
        !job.channels.is_empty()
            && job
                .channels
                .iter()
                .all(|&ch| (ch as usize) < config.channels.len())
    });
    let seqs_ok = config.sequences.iter().all(|seq| {
        !seq.jobs.is_empty()
            && seq.jobs.iter().enumerate().all(|(i, &j)| {
                (j as usize) < config.jobs.len() && !seq.jobs[..i].contains(&j)
            })
    });

    if channels_ok && jobs_ok && seqs_ok {
        Ok(())
    } else {
        Err(Error::Config)
    }
}

fn fill(buf: &mut ChannelBuf, cfg: &ChannelConfig, data: &[u8], len: u16) -> Result<(), Error> {
    if data.len() > len as usize {
        return Err(Error::Length);
    }
    buf.data[..data.len()].copy_from_slice(data);
    buf.data[data.len()..len as usize].fill(cfg.default_data);
    buf.len = len;
    Ok(())
}

fn copy_out(buf: &ChannelBuf, out: &mut [u8]) -> usize {
    let n = out.len().min(buf.len as usize);
    out[..n].copy_from_slice(&buf.data[..n]);
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSpiHw;

    const CH_CMD: ChannelId = 0;
    const CH_DATA: ChannelId = 1;
    const CH_BULK: ChannelId = 2;

    static TEST_CONFIG: SpiConfig = SpiConfig {
        channels: &[
            ChannelConfig {
                buffer: BufferKind::Internal,
                len: 1,
                default_data: 0x00,
            },
            ChannelConfig {
                buffer: BufferKind::Internal,
                len: 2,
                default_data: 0xFF,
            },
            ChannelConfig {
                buffer: BufferKind::External,
                len: 16,
                default_data: 0xA5,
            },
        ],
        jobs: &[
            JobConfig {
                hw_unit: 0,
                cs: 0,
                channels: &[CH_CMD, CH_DATA],
            },
            JobConfig {
                hw_unit: 0,
                cs: 1,
                channels: &[CH_BULK],
            },
            JobConfig {
                hw_unit: 1,
                cs: 0,
                channels: &[CH_CMD],
            },
        ],
        sequences: &[
            SequenceConfig { jobs: &[0] },
            SequenceConfig { jobs: &[0, 1] },
            SequenceConfig { jobs: &[2] },
        ],
    };

    fn spi() -> Spi<MockSpiHw> {
        let mut spi = Spi::new(MockSpiHw::default());
        spi.init(&TEST_CONFIG).unwrap();
        spi
    }

    #[test]
    fn calls_before_init_fail() {
        let mut spi = Spi::new(MockSpiHw::default());
        assert_eq!(spi.get_status(), Status::Uninit);
        assert_eq!(spi.write_ib(CH_CMD, &[1]), Err(Error::Uninit));
        assert_eq!(spi.async_transmit(0), Err(Error::Uninit));
        assert_eq!(spi.get_job_result(0), Err(Error::Uninit));
        assert_eq!(spi.deinit(), Err(Error::Uninit));
        assert_eq!(spi.version_info(), cfg::SPI_VERSION);
    }

    #[test]
    fn double_init_is_rejected() {
        let mut spi = spi();
        assert_eq!(spi.init(&TEST_CONFIG), Err(Error::AlreadyInit));
        spi.deinit().unwrap();
        assert_eq!(spi.get_status(), Status::Uninit);
        spi.init(&TEST_CONFIG).unwrap();
    }

    #[test]
    fn sync_transmit_is_full_duplex() {
        let mut spi = spi();
        spi.hw().reply = |b| b.wrapping_add(1);

        spi.write_ib(CH_CMD, &[0x10]).unwrap();
        spi.write_ib(CH_DATA, &[0x20]).unwrap();
        spi.sync_transmit(0).unwrap();

        assert_eq!(spi.hw().sent, vec![(0, 0, vec![0x10]), (0, 0, vec![0x20, 0xFF])]);
        assert_eq!(spi.hw().selects, vec![(0, 0, true), (0, 0, false)]);

        let mut out = [0u8; 4];
        assert_eq!(spi.read_ib(CH_DATA, &mut out), Ok(2));
        assert_eq!(&out[..2], &[0x21, 0x00]);
        assert_eq!(spi.get_sequence_result(0), Ok(SeqResult::Ok));
        assert_eq!(spi.get_job_result(0), Ok(JobResult::Ok));
    }

    #[test]
    fn buffer_kinds_are_checked() {
        let mut spi = spi();
        assert_eq!(spi.write_ib(CH_BULK, &[1]), Err(Error::BufferKind(CH_BULK)));
        assert_eq!(spi.setup_eb(CH_CMD, None, 1), Err(Error::BufferKind(CH_CMD)));
        assert_eq!(spi.write_ib(CH_CMD, &[1, 2]), Err(Error::Length));
        assert_eq!(spi.setup_eb(CH_BULK, None, 17), Err(Error::Length));
        assert_eq!(spi.setup_eb(CH_BULK, None, 0), Err(Error::Length));
        assert_eq!(spi.write_ib(9, &[1]), Err(Error::InvalidChannel(9)));
    }

    #[test]
    fn unknown_hw_unit_is_rejected() {
        let mut spi = spi();
        assert_eq!(spi.get_hw_unit_status(1), Ok(Status::Idle));
        assert_eq!(spi.get_hw_unit_status(2), Err(Error::InvalidUnit(2)));
        spi.deinit().unwrap();
        assert_eq!(spi.get_hw_unit_status(0), Err(Error::Uninit));
    }

    #[test]
    fn external_buffer_length_is_per_setup() {
        let mut spi = spi();
        spi.setup_eb(CH_BULK, Some(&[1, 2]), 4).unwrap();
        spi.write_ib(CH_CMD, &[0x03]).unwrap();
        spi.write_ib(CH_DATA, &[0x04, 0x05]).unwrap();
        spi.sync_transmit(1).unwrap();

        assert_eq!(spi.hw().sent[2], (0, 1, vec![1, 2, 0xA5, 0xA5]));

        let mut out = [0u8; 16];
        assert_eq!(spi.read_eb(CH_BULK, &mut out), Ok(4));
    }

    #[test]
    fn async_runs_one_job_per_main_call() {
        let mut spi = spi();
        spi.async_transmit(1).unwrap();

        assert_eq!(spi.get_status(), Status::Busy);
        assert_eq!(spi.get_sequence_result(1), Ok(SeqResult::Pending));
        assert_eq!(spi.get_job_result(0), Ok(JobResult::Queued));
        assert_eq!(spi.get_job_result(1), Ok(JobResult::Queued));
        assert_eq!(spi.get_hw_unit_status(0), Ok(Status::Busy));
        assert_eq!(spi.get_hw_unit_status(1), Ok(Status::Idle));
        assert!(spi.hw().sent.is_empty());

        spi.main_function_handling();
        assert_eq!(spi.get_job_result(0), Ok(JobResult::Ok));
        assert_eq!(spi.get_job_result(1), Ok(JobResult::Queued));
        assert_eq!(spi.get_sequence_result(1), Ok(SeqResult::Pending));

        spi.main_function_handling();
        assert_eq!(spi.get_job_result(1), Ok(JobResult::Ok));
        assert_eq!(spi.get_sequence_result(1), Ok(SeqResult::Ok));
        assert_eq!(spi.get_status(), Status::Idle);

        // Nothing left to do.
        spi.main_function_handling();
        assert_eq!(spi.hw().sent.len(), 3);
    }

    #[test]
    fn shared_jobs_conflict() {
        let mut spi = spi();
        spi.async_transmit(1).unwrap();
        assert_eq!(spi.async_transmit(1), Err(Error::SeqPending(1)));
        assert_eq!(spi.async_transmit(0), Err(Error::SeqPending(1)));
        assert_eq!(spi.sync_transmit(0), Err(Error::SeqPending(1)));

        // Independent sequence on another unit is fine.
        spi.async_transmit(2).unwrap();
        assert_eq!(spi.deinit(), Err(Error::Busy));
        assert_eq!(spi.set_async_mode(AsyncMode::Interrupt), Err(Error::Busy));
    }

    #[test]
    fn failed_job_drops_rest_of_sequence() {
        let mut spi = spi();
        spi.hw().fail_after = Some(0);
        spi.async_transmit(1).unwrap();
        spi.async_transmit(2).unwrap();

        spi.main_function_handling();
        assert_eq!(spi.get_job_result(0), Ok(JobResult::Failed));
        assert_eq!(spi.get_job_result(1), Ok(JobResult::Failed));
        assert_eq!(spi.get_sequence_result(1), Ok(SeqResult::Failed));
        // Chip select is released after the failure.
        assert_eq!(spi.hw().selects.last(), Some(&(0, 0, false)));

        spi.hw().fail_after = None;
        spi.main_function_handling();
        assert_eq!(spi.get_sequence_result(2), Ok(SeqResult::Ok));
        assert_eq!(spi.get_status(), Status::Idle);
    }

    #[test]
    fn sync_failure_reports_job() {
        let mut spi = spi();
        spi.hw().fail_after = Some(2);
        assert_eq!(spi.sync_transmit(1), Err(Error::JobFailed(1)));
        assert_eq!(spi.get_sequence_result(1), Ok(SeqResult::Failed));
        assert_eq!(spi.get_job_result(0), Ok(JobResult::Ok));
    }

    #[test]
    fn cancel_drops_queued_jobs() {
        let mut spi = spi();
        spi.async_transmit(1).unwrap();
        spi.main_function_handling();
        spi.cancel(1).unwrap();

        assert_eq!(spi.get_sequence_result(1), Ok(SeqResult::Canceled));
        assert_eq!(spi.get_job_result(0), Ok(JobResult::Ok));
        assert_eq!(spi.get_job_result(1), Ok(JobResult::Failed));
        assert_eq!(spi.get_status(), Status::Idle);

        // Cancelling something that is not pending is a no-op.
        spi.cancel(0).unwrap();
        assert_eq!(spi.get_sequence_result(0), Ok(SeqResult::Ok));
        assert_eq!(spi.cancel(7), Err(Error::InvalidSequence(7)));
    }

    #[test]
    fn interrupt_mode_starts_first_job() {
        let mut spi = spi();
        spi.set_async_mode(AsyncMode::Interrupt).unwrap();
        spi.async_transmit(1).unwrap();
        assert_eq!(spi.get_job_result(0), Ok(JobResult::Ok));
        assert_eq!(spi.get_job_result(1), Ok(JobResult::Queued));
    }
}
