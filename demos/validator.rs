//! Validates one value against `required,email` and prints the outcome.
//!
//! Run with:
//!   cargo run --example validator
//!   cargo run --example validator -- admin@admin.com
//!   cargo run --example validator -- ''

use kite::validate::{self, VarError};

const RULES: &str = "required,email";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let email = std::env::args().nth(1).unwrap_or_else(|| "admin#admin.com".to_owned());

    match validate::var(&email, RULES) {
        Ok(()) => println!("Validation passed"),
        Err(VarError::Invalid(errors)) => {
            for e in &errors {
                println!("Error: {e}");
            }
        }
        Err(VarError::Rule(e)) => {
            tracing::error!("bad rule expression `{RULES}`: {e}");
            std::process::exit(2);
        }
    }
}
