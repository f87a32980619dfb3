//! Build script for pinlink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates link.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use pinlink_core::config::{parse_config, DeviceConfig};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate link.toml configuration at compile time
///
/// The file is checked twice: by the `toml` crate against the serde shape of
/// `DeviceConfig`, and by the same minimal parser the firmware runs, so a
/// file that builds is a file the device accepts.
fn validate_config() {
    // Re-run if link.toml changes
    println!("cargo:rerun-if-changed=link.toml");

    let config_path = Path::new("link.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read link.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: DeviceConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid link.toml                                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    match parse_config(&config_content) {
        Ok(parsed) if parsed == config => {}
        Ok(_) => panic!("link.toml: device parser and toml disagree on the values"),
        Err(e) => panic!("link.toml: rejected by the device parser: {:?}", e),
    }

    validate_values(&config);

    println!("cargo:warning=link.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reject values the hardware cannot honor
fn validate_values(config: &DeviceConfig) {
    let mut errors = Vec::new();

    // RP2040 UART divisor range at the default 125 MHz peripheral clock
    if !(300..=921_600).contains(&config.link.baudrate) {
        errors.push("[link] baudrate must be 300-921600".to_string());
    }
    if config.signal.blink_ms > 5_000 {
        errors.push("[signal] blink_ms must be at most 5000".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in link.toml                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}
