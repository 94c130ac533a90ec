use std::env;
use std::fs;
use std::process;

use emberchat::{ChatConfig, ConfigError};

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: emberchat-validate <config.yml> [more.yml ...]");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  emberchat-validate config.yml");
        eprintln!("  emberchat-validate configs/*.yml");
        process::exit(1);
    }

    let mut exit_code = 0;

    for file_path in &args[1..] {
        match validate_file(file_path) {
            Ok(summary) => {
                println!("✓ {} is valid ({})", file_path, summary);
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file_path);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn validate_file(path: &str) -> Result<String, ConfigError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::Yaml(format!("failed to read file: {}", e)))?;
    let config = ChatConfig::from_yaml_str(&content)?;
    Ok(format!(
        "{} groups, {} presets, {} item tokens, {} inventory tokens",
        config.format.groups.len(),
        config.chatcolor.colors.len(),
        config.previews.tokens.item.len(),
        config.previews.tokens.inventory.len(),
    ))
}

fn print_error(error: &ConfigError) {
    match error {
        ConfigError::Yaml(msg) => {
            eprintln!("  YAML error:");
            eprintln!("    {}", msg);
        }
        other => {
            eprintln!("  Validation error:");
            eprintln!("    {}", other);
        }
    }
}
