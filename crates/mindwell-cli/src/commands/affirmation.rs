use mindwell_core::affirmation::daily_affirmation;

use crate::context::{block_on, CliResult, Context};

pub fn run() -> CliResult {
    let ctx = Context::load()?;
    let api = ctx.api()?;
    let text = block_on(daily_affirmation(&api))?;
    println!("{text}");
    Ok(())
}
