use discord_tsx::{render_markup, TsxError};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: tsx-render <file.yaml|file.json>...");
        eprintln!();
        eprintln!("Builds each markup file and prints the message payload as JSON.");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  tsx-render status.yaml");
        eprintln!("  RUST_LOG=debug tsx-render *.yaml");
        process::exit(1);
    }

    let mut exit_code = 0;

    for file_path in &args[1..] {
        match render_file(file_path) {
            Ok(json) => {
                println!("{}", json);
            }
            Err(e) => {
                eprintln!("✗ {} failed to render:", file_path);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn render_file(path: &str) -> Result<String, TsxError> {
    let content = fs::read_to_string(path)
        .map_err(|e| TsxError::Markup(format!("Failed to read file: {}", e)))?;
    let payload = render_markup(&content)?;
    serde_json::to_string_pretty(&payload).map_err(|e| TsxError::Markup(e.to_string()))
}

fn print_error(error: &TsxError) {
    match error {
        TsxError::InvalidTag { tag } => {
            eprintln!("  Unknown tag '{}'", tag);
        }
        TsxError::InvalidProps { tag, reason } => {
            eprintln!("  Invalid props for <{}>:", tag);
            eprintln!("    {}", reason);
        }
        TsxError::UnexpectedChild { parent, child } => {
            eprintln!("  <{}> cannot contain <{}>", parent, child);
        }
        TsxError::InvalidCommand { name, reason } => {
            eprintln!("  Invalid command '{}':", name);
            eprintln!("    {}", reason);
        }
        TsxError::Markup(msg) => {
            eprintln!("  Markup error:");
            eprintln!("    {}", msg);
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}
