//! Offline dataset compiler.
//!
//! Usage: compile-dataset <image-root> [out.json]
//!
//! Scans `<image-root>/<country>/<file>` and writes the CountryRecord JSON
//! array (sorted, `region` blank for manual fill-in) to the output path, or
//! to stdout when none is given. Non-interactive; output is deterministic
//! for a fixed directory tree.

use std::path::PathBuf;

use tracing::info;

use plonk_backend::compiler::{compile_records, scan_image_tree};
use plonk_backend::telemetry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let mut args = std::env::args().skip(1);
  let Some(root) = args.next().map(PathBuf::from) else {
    eprintln!("usage: compile-dataset <image-root> [out.json]");
    std::process::exit(2);
  };
  let out_path = args.next().map(PathBuf::from);

  let entries = scan_image_tree(&root)?;
  let records = compile_records(entries);
  let json = serde_json::to_string_pretty(&records)?;

  match out_path {
    Some(path) => {
      std::fs::write(&path, json)?;
      info!(target: "dataset", out = %path.display(), countries = records.len(), "Dataset written");
    }
    None => println!("{json}"),
  }
  Ok(())
}
