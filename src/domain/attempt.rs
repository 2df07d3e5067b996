use std::time::Duration;

/// How often the simulated progress ticker fires while processing.
pub const TICK_INTERVAL: Duration = Duration::from_millis(150);
/// Progress added per tick.
pub const TICK_STEP: u8 = 5;
/// Ticker ceiling. Headroom below 100 so the bar cannot appear complete
/// before the gateway call actually resolves.
pub const TICK_CEILING: u8 = 95;
/// Delay between the success transition and the caller continuation.
pub const CONTINUATION_DELAY: Duration = Duration::from_millis(1500);
/// Delay before the form resets to idle. Armed when submission begins.
pub const RESET_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Idle,
    Processing,
    Success,
    Error,
}

impl PaymentStatus {
    /// Success or Error: the form stays read-only here until reset.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// One submit-to-terminal-state cycle of the payment form.
///
/// Mutators enforce the record's invariants: progress is monotonically
/// non-decreasing and clamped while processing, and freezes once a terminal
/// state is reached. Out-of-state calls are ignored rather than panicking,
/// because timers and the gateway resolution race and the loser's write must
/// be a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAttempt {
    pub status: PaymentStatus,
    pub progress: u8,
    pub last_four: Option<String>,
}

impl Default for PaymentAttempt {
    fn default() -> Self {
        Self::idle()
    }
}

impl PaymentAttempt {
    pub fn idle() -> Self {
        Self {
            status: PaymentStatus::Idle,
            progress: 0,
            last_four: None,
        }
    }

    /// Opens the attempt: clears prior progress and snapshots the last four
    /// card digits. Only valid from `Idle`.
    pub fn begin(&mut self, last_four: String) {
        if self.status != PaymentStatus::Idle {
            return;
        }
        self.status = PaymentStatus::Processing;
        self.progress = 0;
        self.last_four = Some(last_four);
    }

    /// One ticker step: `+TICK_STEP`, clamped to `TICK_CEILING`. Ignored
    /// outside `Processing`.
    pub fn tick(&mut self) {
        if self.status != PaymentStatus::Processing {
            return;
        }
        self.progress = self.progress.saturating_add(TICK_STEP).min(TICK_CEILING);
    }

    /// Network resolution with a successful receipt: progress jumps to
    /// exactly 100. Ignored outside `Processing`.
    pub fn succeed(&mut self) {
        if self.status != PaymentStatus::Processing {
            return;
        }
        self.status = PaymentStatus::Success;
        self.progress = 100;
    }

    /// Network resolution with a failure: progress stays at its last ticked
    /// value. Ignored outside `Processing`.
    pub fn fail(&mut self) {
        if self.status != PaymentStatus::Processing {
            return;
        }
        self.status = PaymentStatus::Error;
    }

    /// Returns the form to `Idle`. The next `begin` clears progress.
    pub fn reset(&mut self) {
        self.status = PaymentStatus::Idle;
        self.last_four = None;
    }
}
