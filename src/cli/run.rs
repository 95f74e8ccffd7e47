//! `covercrew run`

use super::context::Context;
use covercrew_core::Runner;

pub async fn run(ctx: &Context, args: Vec<String>) -> anyhow::Result<i32> {
    let runner = Runner::new(
        ctx.runtime.clone(),
        ctx.python.clone(),
        ctx.layout.clone(),
        ctx.runner_config(args),
    );

    let exit = runner.run().await?;
    Ok(exit.code())
}
