pub mod delegate;
pub mod encoder;
pub mod input_device;
pub mod sink;
