mod synthetic_camera;

pub use synthetic_camera::{DeviceInventory, SyntheticCamera};
