pub mod capture;
pub mod identity;
pub mod multimedia;
