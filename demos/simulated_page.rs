//! Drive the speed controller over a simulated page
//!
//! Run with: cargo run --example simulated_page [STORE_PATH]
//!
//! Reads commands from stdin, one per line:
//!
//!   +        increase speed
//!   -        decrease speed
//!   r        reset toggle
//!   t        toggle the site on/off
//!   s        print status
//!   m        insert a media element
//!   p        play every media element (the page resets them to 1x first)
//!   go URL   client-side navigation to URL
//!   q        quit
//!
//! Speeds are stored in STORE_PATH (default: ./media-speed.json), so they
//! survive restarts.

use std::sync::Arc;

use media_speed::page::{Document, MediaElement, SimDocument, SimOverlaySurface};
use media_speed::storage::JsonFileStore;
use media_speed::{ContentScript, ControllerConfig, Request};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("media_speed=debug".parse()?),
        )
        .init();

    let store_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "media-speed.json".to_string());

    let document = Arc::new(SimDocument::new("https://www.youtube.com/watch?v=demo"));
    let surface = Arc::new(SimOverlaySurface::new());
    let config = ControllerConfig::default();
    let mutations = document.observe(config.mutation_queue_size);

    let script = ContentScript::start(
        config,
        document.clone(),
        Arc::new(JsonFileStore::new(&store_path)),
        surface.clone(),
        mutations,
    )
    .await;
    let client = script.client();

    println!("Page: {}", script.controller().document().location());
    println!("Store: {}", store_path);
    print_status(&script);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let request = match line {
            "+" => Some(Request::IncreaseSpeed),
            "-" => Some(Request::DecreaseSpeed),
            "r" => Some(Request::ResetSpeed),
            "t" => Some(Request::ToggleSiteEnablementFromPopup),
            "s" => Some(Request::GetSpeedStatusFromPopup),
            "m" => {
                let media = document.insert_media();
                println!("Inserted {}", media.id());
                None
            }
            "p" => {
                for media in document.media() {
                    media.reset_rate_externally(1.0);
                    media.play();
                    println!("{} playing at {:.2}x", media.id(), media.playback_rate());
                }
                None
            }
            "q" => break,
            _ if line.starts_with("go ") => {
                document.navigate(line[3..].trim());
                println!("Navigated to {}", document.location());
                None
            }
            "" => None,
            other => {
                println!("Unknown command: {}", other);
                None
            }
        };

        if let Some(request) = request {
            let status = client.request(request).await?;
            println!(
                "speed={:.2}x enabled={} overlay={:?}",
                status.current_speed,
                status.enabled_for_site,
                surface.mounted().first().map(|o| o.text.clone()),
            );
        }
    }

    script.shutdown();
    Ok(())
}

fn print_status(script: &ContentScript) {
    let status = script.status();
    println!(
        "speed={:.2}x enabled={}",
        status.current_speed, status.enabled_for_site
    );
}
