mod media_policy;

pub use media_policy::MediaPolicy;
