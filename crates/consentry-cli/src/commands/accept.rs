use anyhow::Result;

use consentry_core::{ConsentController, SqliteJar};

pub async fn run(controller: &mut ConsentController<SqliteJar>) -> Result<()> {
    super::attach_event_printer(controller);

    controller.accept().await?;
    println!("Consent recorded as accepted.");

    Ok(())
}
