pub mod file_sink;
