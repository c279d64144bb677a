//! # Docshelf CLI
//!
//! The binary is intentionally thin: the client lives in `cli/`, and this
//! file only runs it and turns an error into a message and exit status 1.

mod cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
