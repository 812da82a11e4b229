#[tokio::main]
async fn main() {
    if let Err(e) = dodge_arena::run_with_config().await {
        // Tracing may not be up yet if startup failed early.
        eprintln!("dodge_arena: {e}");
        std::process::exit(1);
    }
}
