pub mod domain;
pub mod media_use_cases;
pub mod ports;
pub mod repair_ledger;

pub use media_use_cases::MultimediaUseCases;
