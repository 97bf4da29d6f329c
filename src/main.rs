use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tool_bridge::infra::logging::init();
    tool_bridge::cli::run().await
}
