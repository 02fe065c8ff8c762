pub mod packages;
pub mod player;
pub mod tracking;

use anyhow::Result;
use serde::Serialize;

/// Writes `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
