use anyhow::Result;

use crate::commands::Context;

pub fn run(ctx: &Context, subdir: Option<&str>) -> Result<()> {
    let entries = ctx.entries.list(subdir);
    if entries.is_empty() {
        println!(
            "No entries found in {}. Add one with: passclip insert <entry>",
            ctx.entries.root().display()
        );
    } else {
        for entry in &entries {
            println!("{}", entry);
        }
    }
    Ok(())
}
