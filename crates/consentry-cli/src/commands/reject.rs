use anyhow::Result;

use consentry_core::{ConsentController, SqliteJar};

pub async fn run(controller: &mut ConsentController<SqliteJar>) -> Result<()> {
    super::attach_event_printer(controller);

    let purged = controller.reject().await?;
    println!("Consent recorded as rejected.");

    if purged > 0 {
        println!("Purged {purged} other stored entr{}.", plural(purged));
    } else {
        println!("No other stored entries to purge.");
    }

    Ok(())
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}
