use std::env;

use racing_env::{
    init_logging,
    utils::{DEFAULT_PUB_PORT, DEFAULT_SUB_PORT},
    StubRenderer,
};
use tracing::{error, info};

/// Usage: racing_stub_renderer [pub_port] [sub_port]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut args = env::args().skip(1);
    let pub_port = match args.next() {
        Some(port) => port.parse()?,
        None => DEFAULT_PUB_PORT,
    };
    let sub_port = match args.next() {
        Some(port) => port.parse()?,
        None => DEFAULT_SUB_PORT,
    };

    let renderer = StubRenderer::bind("127.0.0.1", pub_port, sub_port)?;
    let (pub_port, sub_port) = renderer.local_ports()?;
    info!("Stub renderer listening (pub {}, sub {})", pub_port, sub_port);
    // Machine-readable line for launch scripts
    println!("PORTS={},{}", pub_port, sub_port);

    if let Err(e) = renderer.run(None) {
        error!("Stub renderer stopped: {}", e);
        return Err(e.into());
    }
    Ok(())
}
