//! Walks an Octosend account: lists sending domains, streams ready
//! spoolers, and previews one mail.
//!
//! Needs `OCTOSEND_USERNAME` and `OCTOSEND_PASSWORD` in the environment.
//! Run with `RUST_LOG=octosend_client=debug` to see the underlying calls.

use futures::TryStreamExt;
use octosend_client::{Client, IterateOptions};
use std::pin::pin;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let username = std::env::var("OCTOSEND_USERNAME")?;
    let password = std::env::var("OCTOSEND_PASSWORD")?;

    let mut client = Client::builder().build()?;
    client.authenticate(&username, &password).await?;

    let domains = client.domains();
    println!("{} sending domains:", domains.count().await?);
    let mut stream = pin!(domains.iterate(IterateOptions::new().batch_size(20)));
    while let Some(domain) = stream.try_next().await? {
        println!("  {}", domain.name());
    }

    let mut spoolers = client.spoolers();
    spoolers.state("ready");
    println!("first ready spoolers:");
    let mut stream = pin!(spoolers.iterate(IterateOptions::new().count(10)));
    while let Some(spooler) = stream.try_next().await? {
        println!(
            "  {} [{}] on {}",
            spooler.name().unwrap_or("<unnamed>"),
            spooler.kind(),
            spooler.domain_name()
        );

        let events = spooler.events("open");
        let mut opens = pin!(events.iterate(IterateOptions::new().count(3)));
        while let Some(event) = opens.try_next().await? {
            println!("    open: {event}");
        }
    }

    Ok(())
}
