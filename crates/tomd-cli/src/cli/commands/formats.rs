//! `tomd formats` – list supported input formats and the active converter.

use tomd_core::config::TomdConfig;
use tomd_core::converter::{find_program, SUPPORTED_FORMATS};

pub fn run_formats(cfg: &TomdConfig) {
    println!("Supported input formats:");
    for chunk in SUPPORTED_FORMATS.chunks(8) {
        println!("  {}", chunk.join(", "));
    }
    match find_program(&cfg.converter.program) {
        Some(path) => println!("Converter: {} ({})", cfg.converter.program, path.display()),
        None => println!(
            "Converter: {} not found; files will get metadata summaries instead",
            cfg.converter.program
        ),
    }
}
