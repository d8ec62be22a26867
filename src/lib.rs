pub mod modules;
pub use modules::capture;
pub use modules::identity;
pub use modules::multimedia;
pub mod health;
pub mod shared;

use crate::multimedia::application::MultimediaUseCases;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub multimedia: MultimediaUseCases,
}
