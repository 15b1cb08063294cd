use anyhow::Result;

use consentry_core::{ConsentController, SqliteJar};

pub async fn run(controller: &mut ConsentController<SqliteJar>) -> Result<()> {
    controller.reset().await?;
    println!("Consent record deleted; the banner will show on the next visit.");

    Ok(())
}
