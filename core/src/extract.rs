//! # Address Extraction
//!
//! Scan-result files have no fixed schema, so every string anywhere in the
//! document is a potential address. The document is walked as a
//! [`serde_json::Value`] tree and each string that parses as an IPv4 or IPv6
//! literal is collected. Object keys are not inspected.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::Value;

use cleanip_common::error::{CleanIpError, Result};
use cleanip_common::network::address::Address;

/// Reads `path` and returns every distinct address found in it.
pub fn extract_from_file(path: &Path) -> Result<BTreeSet<Address>> {
    let content = fs::read_to_string(path)?;
    extract_from_str(&content).map_err(|source| CleanIpError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn extract_from_str(content: &str) -> serde_json::Result<BTreeSet<Address>> {
    let document: Value = serde_json::from_str(content)?;
    Ok(extract_addresses(&document))
}

pub fn extract_addresses(document: &Value) -> BTreeSet<Address> {
    let mut found = BTreeSet::new();
    visit(document, &mut found);
    found
}

fn visit(value: &Value, found: &mut BTreeSet<Address>) {
    match value {
        Value::String(text) => {
            if let Ok(addr) = text.parse::<Address>() {
                found.insert(addr);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit(item, found);
            }
        }
        Value::Object(fields) => {
            for field in fields.values() {
                visit(field, found);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
