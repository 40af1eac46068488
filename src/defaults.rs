//! Default constants shared across configuration types.

/// Longest segment, in seconds, the recognition engine accepts.
///
/// Whisper-family models break on inputs longer than 30 seconds, so sources
/// either truncate (Voxpopuli) or split (Librilight) anything above this.
pub const MAX_SEGMENT_SECS: usize = 30;

/// Default audio sampling rate in Hz.
///
/// 16kHz is what Whisper-family feature extractors expect; sources never
/// resample, so corpora must already be stored at the configured rate.
pub const SAMPLING_RATE: u32 = 16000;

/// Default number of records handed to the transcriber at once.
pub const BATCH_SIZE: usize = 1;

/// Default progress-log interval, in number of processed records.
///
/// Source sizes are unknown in advance, so progress is reported as a running
/// count rather than a percentage.
pub const LOGGING_FREQ: usize = 100;
