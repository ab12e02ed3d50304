//! Mapping from rumble intensity to channel volumes

mod linear;
mod mapper;
mod volume;

pub use linear::LinearMapper;
pub use mapper::{clamp_to_band, Mapper};
pub use volume::{map_volumes, MappingMode, MotorIntensity, VolumeTarget, HALF_INTENSITY, MAX_INTENSITY};
