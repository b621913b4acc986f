//! `graft-patch` — apply a JSON Patch (RFC 6902) to a document.
//!
//! Usage:
//!   graft-patch '<patch-array-json>'
//!
//! The document is read from stdin. The patch operations are the first
//! argument. The patched document is written to stdout.

use std::io::{self, Read, Write};

use graft::{Node, PatchDocument};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let patch_text = match args.get(1) {
        Some(p) => p.clone(),
        None => {
            eprintln!("First argument must be a JSON patch array.");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match apply(buf.trim(), &patch_text) {
        Ok(result) => {
            io::stdout().write_all(result.as_bytes()).unwrap();
            io::stdout().write_all(b"\n").unwrap();
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn apply(doc_text: &str, patch_text: &str) -> Result<String, String> {
    let doc: serde_json::Value =
        serde_json::from_str(doc_text).map_err(|e| format!("invalid document: {e}"))?;
    let patch =
        PatchDocument::from_json_str(patch_text).map_err(|e| format!("invalid patch: {e}"))?;

    let mut target = Node::from_json(&doc);
    patch.apply_to(&mut target).map_err(|e| e.to_string())?;

    serde_json::to_string(&target.to_json()).map_err(|e| e.to_string())
}
