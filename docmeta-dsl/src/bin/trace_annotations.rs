/// Annotation Tracer - Shows the flow through doc comment → tokens → annotation set
///
/// Usage: cargo run --bin trace_annotations [file]
///
/// Reads stdin when no file is given. Log level comes from RUST_LOG.
use docmeta_core::ReflectionConfig;
use docmeta_dsl::{parse_doc_comment, tokenize};
use std::io::Read;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let content = match args.get(1) {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to read {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
                eprintln!("❌ Failed to read stdin: {}", e);
                std::process::exit(1);
            }
            buffer
        }
    };

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ ANNOTATION TRACER");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    println!("📝 INPUT:");
    println!("{}", content);
    println!();

    println!("🔍 TOKENS:");
    println!("─────────────────────────────────────────────────────────────");
    for token in tokenize(&content) {
        println!(
            "  {:>4}:{:<4} {}",
            token.span.line, token.span.column, token.kind
        );
    }
    println!();

    let parsed = parse_doc_comment(Some(&content), &ReflectionConfig::default());

    println!("📦 ANNOTATIONS:");
    println!("─────────────────────────────────────────────────────────────");
    match serde_json::to_string_pretty(&parsed.annotations.to_json()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("❌ Failed to serialize annotations: {}", e);
            std::process::exit(1);
        }
    }

    if !parsed.diagnostics.is_empty() {
        println!();
        println!("⚠️  SKIPPED:");
        for diagnostic in &parsed.diagnostics {
            println!("  {}", diagnostic);
        }
        std::process::exit(2);
    }
}
