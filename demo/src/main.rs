use std::env;
use std::error::Error;
use std::time::Duration;

use nonblock_input::{LineBuffer, Shutdown, ShutdownError};
use tracing_subscriber::EnvFilter;

const DEFAULT_SECONDS: u32 = 10;
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let seconds: u32 = match args.get(1) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("Usage: cargo run --bin demo -- [seconds], got {raw:?}"))?,
        None => DEFAULT_SECONDS,
    };

    println!("[demo] Type lines below; whatever buffered is drained once per second.");
    let mut input = LineBuffer::stdin();

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await; // the first tick fires immediately

    for _ in 0..seconds {
        ticker.tick().await;
        println!("[demo] {:?}", input.read_all().unwrap_or_default());
    }

    // The collector is parked in a blocking stdin read; shutdown prompts
    // for one more line to unblock it rather than hanging forever.
    match tokio::task::block_in_place(|| input.shutdown(Some(SHUTDOWN_TIMEOUT))) {
        Ok(Shutdown::Clean) => println!("[demo] Stdin is yours again. Bye!"),
        Ok(Shutdown::AlreadyStopped) => {}
        Err(e @ ShutdownError::Timeout(_)) => {
            eprintln!("[demo] Failed to stop cleanly: {e}");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
