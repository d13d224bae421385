//! In-process stand-in for a DSP core

#![allow(dead_code)]

use qsc_dsp::{DspClient, DspConfig};
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

pub const GREETING: &str =
    r#"{"jsonrpc":"2.0","method":"EngineStatus","params":{"Platform":"Core 110f","State":"Active"}}"#;

/// What the mock does on one accepted connection
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Frame pushed right after accept, `None` to stay silent
    pub greeting: Option<String>,
    /// Frame sent after the request arrives, `None` to stay silent
    pub reply: Option<String>,
}

impl Exchange {
    pub fn reply(reply: impl Into<String>) -> Self {
        Self {
            greeting: Some(GREETING.to_string()),
            reply: Some(reply.into()),
        }
    }
}

/// What the mock observed on one connection
#[derive(Debug)]
pub struct Seen {
    pub request: Option<Value>,
    pub closed: bool,
}

pub struct MockDevice {
    pub port: u16,
    seen: mpsc::UnboundedReceiver<Seen>,
}

impl MockDevice {
    /// Serve one connection per exchange, in order
    pub async fn spawn(exchanges: Vec<Exchange>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, seen) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            for exchange in exchanges {
                let (stream, _) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(_) => return,
                };
                let mut stream = BufReader::new(stream);

                if let Some(greeting) = &exchange.greeting {
                    let _ = stream.get_mut().write_all(greeting.as_bytes()).await;
                    let _ = stream.get_mut().write_all(&[0]).await;
                }

                let mut frame = Vec::new();
                let request = match timeout(
                    Duration::from_secs(5),
                    stream.read_until(0, &mut frame),
                )
                .await
                {
                    Ok(Ok(_)) if frame.last() == Some(&0) => {
                        frame.pop();
                        serde_json::from_slice(&frame).ok()
                    }
                    _ => None,
                };

                if request.is_some() {
                    if let Some(reply) = &exchange.reply {
                        let _ = stream.get_mut().write_all(reply.as_bytes()).await;
                        let _ = stream.get_mut().write_all(&[0]).await;
                    }
                }

                let mut rest = Vec::new();
                let closed = timeout(Duration::from_secs(5), stream.read_to_end(&mut rest))
                    .await
                    .is_ok();

                let _ = tx.send(Seen { request, closed });
            }
        });

        Self { port, seen }
    }

    /// Wait for the report of the next finished connection
    pub async fn next(&mut self) -> Seen {
        timeout(Duration::from_secs(10), self.seen.recv())
            .await
            .expect("mock device did not report")
            .expect("mock device stopped")
    }

    pub fn client(&self) -> DspClient {
        DspClient::with_config("127.0.0.1", self.config())
    }

    pub fn config(&self) -> DspConfig {
        DspConfig::default()
            .with_port(self.port)
            .with_read_timeout(Duration::from_millis(300))
    }
}

pub fn get_reply(entries: &[(&str, f64)]) -> String {
    let result: Vec<Value> = entries
        .iter()
        .map(|(name, value)| serde_json::json!({ "Name": name, "Value": value }))
        .collect();
    serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
}

pub fn set_reply(name: &str, value: f64) -> String {
    serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": { "Name": name, "Value": value } })
        .to_string()
}
