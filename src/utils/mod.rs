pub mod bitstream;
pub mod level;
pub mod peak;
