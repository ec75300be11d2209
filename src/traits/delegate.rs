use crate::models::error::RecorderError;
use crate::models::state::RecorderState;

/// Event delegate for recorder session notifications.
///
/// Methods are called from the capture or encode thread, never the host
/// thread. Implementations should marshal to their own context if needed.
/// This is the single error channel: failures are never thrown across
/// thread boundaries, each thread funnels its faults through `on_error`.
pub trait RecorderDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, _state: &RecorderState) {}

    /// Called when an error occurs during setup, capture, or encoding.
    fn on_error(&self, error: &RecorderError);
}
