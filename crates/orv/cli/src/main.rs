//! orv - OCI runtime conformance validator

#[tokio::main]
async fn main() {
    if let Err(err) = orv_cli::run().await {
        if !matches!(err, orv_cli::CliError::NonConformant { .. }) {
            orv_cli::output::print_error(&err.to_string());
        }
        std::process::exit(err.exit_code());
    }
}
