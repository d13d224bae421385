//! Command-line control of a Q-SYS core
//!
//! ```text
//! cargo run --example dsp_control -- 10.0.0.5 status
//! cargo run --example dsp_control -- 10.0.0.5 volume Mic1
//! cargo run --example dsp_control -- 10.0.0.5 volume Mic1 50
//! cargo run --example dsp_control -- 10.0.0.5 mute Mic1 on
//! cargo run --example dsp_control -- 10.0.0.5 toggle Mic1
//! cargo run --example dsp_control -- 10.0.0.5 volumes Mic1 Mic2 Mic3
//! ```
//!
//! Set `RUST_LOG=qsc_dsp=debug` to see the frames on the wire.

use qsc_dsp::{CancellationToken, DspClient, NoHostnameLookup};
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("usage: dsp_control <address> <status|volume|mute|toggle|volumes|mutes|get|set> [args...]");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        usage();
    }

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let dsp = DspClient::new(args[0].as_str()).with_cancellation(token);
    let rest = &args[2..];

    match (args[1].as_str(), rest) {
        ("status", []) => {
            let details = dsp.details(&NoHostnameLookup).await?;
            println!("{:#?}", details);
        }
        ("volume", [block]) => println!("{}", dsp.get_volume(block).await?),
        ("volume", [block, level]) => println!("{}", dsp.set_volume(block, level.parse()?).await?),
        ("mute", [block]) => println!("{}", dsp.get_mute(block).await?),
        ("mute", [block, state]) => {
            let muted = matches!(state.as_str(), "on" | "true" | "1");
            println!("{}", dsp.set_mute(block, muted).await?);
        }
        ("toggle", [block]) => println!("{}", dsp.toggle_mute(block).await?),
        ("volumes", blocks) if !blocks.is_empty() => {
            for (block, level) in dsp.get_volumes(blocks).await? {
                println!("{}: {}", block, level);
            }
        }
        ("mutes", blocks) if !blocks.is_empty() => {
            for (block, muted) in dsp.get_mutes(blocks).await? {
                println!("{}: {}", block, muted);
            }
        }
        ("get", [name]) => {
            for value in dsp.get_control_status(name).await?.result {
                println!("{}: {}", value.name, value.value);
            }
        }
        ("set", [name, value]) => {
            let ack = dsp.set_control_status_str(name, value).await?;
            println!("{}: {}", ack.result.name, ack.result.value);
        }
        _ => usage(),
    }

    Ok(())
}
