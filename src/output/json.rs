use anyhow::Result;
use serde::Serialize;

/// Pretty-printed JSON for any serializable value. Drift reports and
/// artifact listings share this one seam so `--output json` stays uniform
/// across subcommands.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
