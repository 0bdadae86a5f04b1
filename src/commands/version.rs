use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("hwreport version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
