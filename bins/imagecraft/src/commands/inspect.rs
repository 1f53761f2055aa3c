//! Detect and info commands

use super::read_input;
use imagecraft_cli::output::{print_metadata, Status};
use imagecraft_core::error::exit_codes;
use imagecraft_core::{Result, ResultExt};
use imagecraft_image::{detect_format, probe};
use std::path::Path;

/// Print the container format identified from magic bytes
pub fn detect(path: &Path) -> Result<i32> {
    let data = read_input(path)?;
    let format = detect_format(&data).context(path.display().to_string())?;

    println!("Format: {}", format.extension());
    println!("MIME: {}", format.mime_type());
    println!("Extensions: {}", format.extensions().join(", "));
    println!("Lossy: {}", if format.is_lossy() { "yes" } else { "no" });
    println!("Alpha: {}", if format.supports_alpha() { "yes" } else { "no" });
    if !format.is_encodable() {
        Status::warning("This format can be detected but not written");
    }
    Ok(exit_codes::SUCCESS)
}

/// Print header metadata
pub fn info(path: &Path, json: bool) -> Result<i32> {
    let data = read_input(path)?;
    let meta = probe(&data).context(path.display().to_string())?;

    if json {
        let mut value = serde_json::to_value(&meta)?;
        value["aspect_ratio"] = serde_json::json!(meta.aspect_ratio());
        value["orientation"] = serde_json::json!(meta.orientation());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_metadata(&path.display().to_string(), &meta);
    }
    Ok(exit_codes::SUCCESS)
}
