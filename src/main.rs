use anyhow::Result;
use clap::Parser;
use serde_json::json;
use std::sync::Arc;
use tokio::runtime::Builder;
use tracing::info;

use palisade::audit::QueryAudit;
use palisade::cli::{self, Cli};
use palisade::csp::{generate_csp, CspOptions};
use palisade::driver::{NullDriver, SqlValue};
use palisade::guard::{GuardConfig, QueryGuard};
use palisade::sanitize::{sanitize_filename, sanitize_url, sanitize_user_input, SanitizeOptions};

fn main() -> Result<()> {
    // Everything here is CPU-bound string work; a small runtime is plenty
    let runtime = Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::Sanitize {
            text,
            allow_html,
            preserve_line_breaks,
            max_length,
        } => {
            let options = SanitizeOptions {
                max_length: *max_length,
                allow_html: *allow_html,
                preserve_line_breaks: *preserve_line_breaks,
                ..Default::default()
            };
            let cleaned = sanitize_user_input(text, &options);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "sanitized": cleaned }))?
            );
        }

        cli::Commands::CheckQuery { sql, params } => {
            let audit = Arc::new(QueryAudit::new());
            let guard = QueryGuard::new(NullDriver, GuardConfig::default(), Arc::clone(&audit));

            let values: Vec<SqlValue> = params.iter().map(|p| p.as_str().into()).collect();
            info!(param_count = values.len(), "dry-running statement");

            match guard.safe_query(sql, &values, "cli.check_query").await {
                Ok(_) => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "valid": true }))?);
                }
                Err(e) => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "valid": false,
                            "error": e.to_string(),
                            "audit": audit.stats(),
                        }))?
                    );
                    std::process::exit(1);
                }
            }
        }

        cli::Commands::Url { url } => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "url": sanitize_url(url) }))?
            );
        }

        cli::Commands::Filename { name } => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "filename": sanitize_filename(name) }))?
            );
        }

        cli::Commands::Csp {
            inline_styles,
            inline_scripts,
            allow_eval,
        } => {
            let options = CspOptions {
                allow_inline_styles: *inline_styles,
                allow_inline_scripts: *inline_scripts,
                allow_eval: *allow_eval,
                ..Default::default()
            };
            println!("{}", generate_csp(&options));
        }
    }

    Ok(())
}
