//! Print the serial ports present on this machine.
//!
//! Run with: cargo run --example list_ports

use buffered_serial::list_port_identifiers;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ports = list_port_identifiers()?;
    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Found {} serial port(s):", ports.len());
        for port in ports {
            println!("  {port}");
        }
    }
    Ok(())
}
