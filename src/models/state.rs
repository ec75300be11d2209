/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → starting → running → stopping → idle
///           ↓ (init failure)      ↑
///          idle    running ───────┘ (stop() or duration cutoff)
/// ```
///
/// `Idle` is both the initial and the final state. `Running` moves to
/// `Stopping` either through an explicit `stop()` or through the
/// maximum-duration cutoff checked once per read cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Starting,
    Running,
    Stopping,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_stopping(&self) -> bool {
        matches!(self, Self::Stopping)
    }
}
