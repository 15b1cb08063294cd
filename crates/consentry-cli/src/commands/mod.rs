pub mod accept;
pub mod list;
pub mod reject;
pub mod reset;
pub mod status;

use consentry_core::{ConsentController, SqliteJar};

/// Print each broadcast event as one JSON line
pub fn attach_event_printer(controller: &mut ConsentController<SqliteJar>) {
    controller.subscribe(|event| match serde_json::to_string(event) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!("Could not encode consent event: {}", e),
    });
}
