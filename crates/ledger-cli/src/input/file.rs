use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read a JSON file and deserialise into a typed value.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    if !p.is_file() {
        return Err(format!("Not a readable file: {}", p.display()).into());
    }

    let contents =
        fs::read_to_string(p).map_err(|e| format!("Failed to read '{}': {}", p.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", p.display(), e))?;
    Ok(value)
}
