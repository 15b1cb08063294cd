mod database;
mod jar;
mod memory;

pub use database::SqliteJar;
pub use jar::{Cookie, CookieJar, CookieScope};
pub use memory::MemoryJar;
