//! `x509-exporter config` - Print the effective configuration.

use anyhow::Result;

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    config.validate()?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
