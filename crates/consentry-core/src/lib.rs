pub mod config;
pub mod consent;
pub mod error;
pub mod events;
pub mod page;
pub mod store;

pub use config::AppConfig;
pub use consent::{ConsentController, ConsentEvent, ConsentStatus};
pub use error::{Error, Result};
pub use page::{ClickEvent, Element, ElementId, Page};
pub use store::{CookieJar, CookieScope, MemoryJar, SqliteJar};
