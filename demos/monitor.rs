//! Open a serial port and echo whatever arrives.
//!
//! Picks the port from the SERIAL_PORT environment variable, falling back to
//! the first port on the system. Run with:
//!
//!   SERIAL_PORT=/dev/ttyUSB0 cargo run --example monitor

use buffered_serial::{list_port_identifiers, SerialSession};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "buffered_serial=debug".into()),
        )
        .init();

    let port = match std::env::var("SERIAL_PORT") {
        Ok(p) => p,
        Err(_) => list_port_identifiers()?
            .into_iter()
            .next()
            .ok_or("no serial ports found; set SERIAL_PORT")?,
    };

    let session = Arc::new(SerialSession::new());
    let reader = Arc::clone(&session);
    session.on_data_available(move |_| {
        if let Some(text) = reader.read_string() {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
    });

    session.open(&port)?;
    println!("monitoring {port} at 9600 8N1, ctrl-c to quit");

    loop {
        std::thread::sleep(Duration::from_secs(1));
    }
}
