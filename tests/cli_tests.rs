use clap::Parser;

use palisade::cli::{Cli, Commands};

#[test]
fn parses_sanitize_command() {
    let cli = Cli::try_parse_from([
        "palisade",
        "sanitize",
        "<b>hello</b>",
        "--allow-html",
        "--max-length",
        "200",
    ])
    .unwrap();

    match cli.command {
        Commands::Sanitize {
            text,
            allow_html,
            max_length,
            preserve_line_breaks,
        } => {
            assert_eq!(text, "<b>hello</b>");
            assert!(allow_html);
            assert_eq!(max_length, 200);
            assert!(!preserve_line_breaks);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parses_check_query_with_repeated_params() {
    let cli = Cli::try_parse_from([
        "palisade",
        "check-query",
        "SELECT * FROM ads WHERE state = $1 AND price <= $2",
        "--param",
        "SP",
        "--param",
        "500",
    ])
    .unwrap();

    match cli.command {
        Commands::CheckQuery { sql, params } => {
            assert!(sql.contains("$2"));
            assert_eq!(params, vec!["SP", "500"]);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parses_csp_flags() {
    let cli = Cli::try_parse_from(["palisade", "csp", "--inline-styles"]).unwrap();
    match cli.command {
        Commands::Csp {
            inline_styles,
            inline_scripts,
            allow_eval,
        } => {
            assert!(inline_styles);
            assert!(!inline_scripts);
            assert!(!allow_eval);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["palisade", "teleport"]).is_err());
}
