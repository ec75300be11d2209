pub mod frame_align;
pub mod volume_meter;
