//! Manual probe for a running relay.
//!
//! Connects to the relay endpoint, sends one chat message and prints the reply.
//!
//! ```text
//! relay-probe --message "Hello" --header "Authorization: Bearer xyz"
//! ```

use std::time::Duration;

use clap::Parser;
use futures::{SinkExt, StreamExt};
use http::{HeaderName, HeaderValue};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser, Debug)]
#[command(name = "relay-probe", about = "Send one message to a bedrock relay")]
struct Args {
    /// Relay WebSocket URL
    #[arg(long, env = "RELAY_PROBE_URL", default_value = "ws://127.0.0.1:8000/ws/bedrock-chat")]
    url: String,

    /// Message content
    #[arg(short, long, default_value = "Hello")]
    message: String,

    /// Extra request header, as `Name: value` (repeatable)
    #[arg(long = "header")]
    headers: Vec<String>,

    /// Seconds to wait for the reply
    #[arg(long, default_value_t = 150)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut request = args.url.as_str().into_client_request()?;
    for raw in &args.headers {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| format!("header must be `Name: value`, got {:?}", raw))?;
        request.headers_mut().insert(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }

    let (socket, _) = connect_async(request).await?;
    let (mut write, mut read) = socket.split();

    let payload = serde_json::json!({ "content": args.message }).to_string();
    println!("> {}", payload);
    write.send(Message::Text(payload)).await?;

    let reply = tokio::time::timeout(Duration::from_secs(args.timeout_secs), async {
        while let Some(msg) = read.next().await {
            match msg? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Close(_) => return Ok(None),
                _ => continue,
            }
        }
        Ok::<_, tokio_tungstenite::tungstenite::Error>(None)
    })
    .await
    .map_err(|_| format!("no reply within {}s", args.timeout_secs))??;

    match reply {
        Some(text) => println!("< {}", text),
        None => println!("connection closed without a reply"),
    }

    write.send(Message::Close(None)).await.ok();
    Ok(())
}
