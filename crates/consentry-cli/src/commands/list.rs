use anyhow::Result;

use consentry_core::{ConsentController, CookieJar, SqliteJar};

pub async fn run(controller: &ConsentController<SqliteJar>) -> Result<()> {
    let names = controller.jar().names().await?;

    if names.is_empty() {
        println!("No stored entries.");
        return Ok(());
    }

    for name in &names {
        println!("{name}");
    }
    println!("{} entr{} total.", names.len(), if names.len() == 1 { "y" } else { "ies" });

    Ok(())
}
