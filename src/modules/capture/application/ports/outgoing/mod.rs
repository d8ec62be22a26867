mod media_devices;

pub use media_devices::{DeviceError, DeviceStream, MediaDevices, StreamConstraints};
