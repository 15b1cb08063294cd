use anyhow::Result;

use consentry_core::{ConsentController, SqliteJar};

pub async fn run(controller: &ConsentController<SqliteJar>) -> Result<()> {
    match controller.status().await? {
        Some(value) => {
            println!("Consent: {value}");
            println!("Banner would be hidden.");
        }
        None => {
            println!("Consent: unset");
            println!("Banner would be shown.");
        }
    }

    Ok(())
}
