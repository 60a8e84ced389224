//! Version code command

use anyhow::Result;
use magiskfrida_schema::version::version_code as compute;

pub fn version_code(tag: &str) -> Result<()> {
    println!("{}", compute(tag)?);
    Ok(())
}
