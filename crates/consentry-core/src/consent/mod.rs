mod controller;
mod models;

pub use controller::{ConsentAction, ConsentController};
pub use models::{ConsentEvent, ConsentStatus};
