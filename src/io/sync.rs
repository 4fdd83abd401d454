//! Translation between the logical (sync) timeline the pattern runs on and
//! the output device's audio clock.

/// Maps between a shared logical clock and the local audio clock
///
/// Both directions are monotonic and expressed in seconds. A networked
/// implementation would estimate the offset continuously; the core only
/// ever asks for conversions.
pub trait SyncProvider {
    /// Local output-device time for a logical time
    fn audio_time(&self, sync_time: f64) -> f64;

    /// Logical time for a local output-device time
    fn sync_time(&self, audio_time: f64) -> f64;
}

/// Logical time is audio time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalSync;

impl SyncProvider for LocalSync {
    fn audio_time(&self, sync_time: f64) -> f64 {
        sync_time
    }

    fn sync_time(&self, audio_time: f64) -> f64 {
        audio_time
    }
}

/// Logical time runs `offset` seconds ahead of audio time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OffsetSync {
    offset: f64,
}

impl OffsetSync {
    pub fn new(offset: f64) -> Self {
        Self { offset }
    }

    /// A sync whose logical zero lands at `audio_time`
    pub fn starting_at(audio_time: f64) -> Self {
        Self::new(-audio_time)
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl SyncProvider for OffsetSync {
    fn audio_time(&self, sync_time: f64) -> f64 {
        sync_time - self.offset
    }

    fn sync_time(&self, audio_time: f64) -> f64 {
        audio_time + self.offset
    }
}

impl<S: SyncProvider + ?Sized> SyncProvider for &S {
    fn audio_time(&self, sync_time: f64) -> f64 {
        (**self).audio_time(sync_time)
    }

    fn sync_time(&self, audio_time: f64) -> f64 {
        (**self).sync_time(audio_time)
    }
}

impl<S: SyncProvider + ?Sized> SyncProvider for Box<S> {
    fn audio_time(&self, sync_time: f64) -> f64 {
        (**self).audio_time(sync_time)
    }

    fn sync_time(&self, audio_time: f64) -> f64 {
        (**self).sync_time(audio_time)
    }
}
