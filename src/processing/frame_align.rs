/// Capture buffer size alignment.
///
/// The encode pipeline batches samples in fixed notification periods, so the
/// capture buffer must hold a whole number of them; otherwise the last
/// period of every read would be torn across two buffers.

/// Round a device-reported minimum buffer size up to the next multiple of
/// the notification period.
///
/// The minimum is converted to frames (rounding up if it is not itself
/// frame-aligned), the frame count is rounded up to a multiple of
/// `period_frames`, and the result converted back to bytes. Pure and
/// idempotent: aligning an already-aligned size returns it unchanged.
pub fn aligned_buffer_size(
    min_buffer_size_bytes: usize,
    bytes_per_frame: usize,
    period_frames: usize,
) -> usize {
    let mut frames = min_buffer_size_bytes.div_ceil(bytes_per_frame);
    let remainder = frames % period_frames;
    if remainder != 0 {
        frames += period_frames - remainder;
    }
    frames * bytes_per_frame
}
