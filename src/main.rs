use anyhow::Result;
use eyedrop::cli;

fn main() -> Result<()> {
    cli::parse()?;
    Ok(())
}
