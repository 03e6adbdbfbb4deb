/// Size limits enforced by the frame decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest payload a single frame may announce.
    pub max_frame: u64,
    /// Largest payload a message may accumulate across its frames.
    pub max_message: u64,
}

impl Limits {
    /// Default frame limit, 16 MiB.
    pub const DEFAULT_MAX_FRAME: u64 = 16 * 1024 * 1024;
    /// Default message limit, 32 MiB.
    pub const DEFAULT_MAX_MESSAGE: u64 = 32 * 1024 * 1024;

    /// Creates new [`Limits`].
    pub const fn new(max_frame: u64, max_message: u64) -> Self {
        Self {
            max_frame,
            max_message,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_FRAME, Self::DEFAULT_MAX_MESSAGE)
    }
}
