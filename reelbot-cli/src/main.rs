//! reelbot interactive chat CLI.
//!
//! Runs the engine in-process over a file-backed catalog and prints
//! deliveries to the terminal, so the whole dialog flow can be exercised
//! without a chat network.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use colored::*;

use reelbot::catalog::FileCatalogStore;
use reelbot::config::BotConfig;
use reelbot::delivery::ChatTransport;
use reelbot::errors::BotResult;
use reelbot::service::BotService;

#[derive(Parser, Debug)]
#[command(name = "reelbot-cli")]
#[command(about = "Interactive chat with the reelbot catalog assistant")]
struct Args {
    #[arg(long, default_value = "storage/catalog.json")]
    catalog_path: PathBuf,

    #[arg(long, default_value = "user1")]
    user_id: String,

    /// Treat this session as a privileged (admin) caller.
    #[arg(long)]
    admin: bool,
}

struct ConsoleTransport;

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send_text(&self, _caller_id: &str, text: &str) -> BotResult<()> {
        println!("{} {}", "bot>".green().bold(), text);
        Ok(())
    }

    async fn send_links(
        &self,
        _caller_id: &str,
        text: &str,
        links: &[(String, String)],
    ) -> BotResult<()> {
        println!("{} {}", "bot>".green().bold(), text);
        for (label, url) in links {
            println!("     {} {}", format!("[{}]", label).yellow(), url.blue().underline());
        }
        Ok(())
    }

    async fn send_binary(&self, _caller_id: &str, handle: &str, caption: &str) -> BotResult<()> {
        println!(
            "{} {} {}",
            "bot>".green().bold(),
            format!("<file {}>", handle).magenta(),
            caption
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = BotConfig::default();
    config.catalog_path = args.catalog_path.clone();

    let catalog = Arc::new(FileCatalogStore::new(config.catalog_path.clone())?);
    let transport = Arc::new(ConsoleTransport);
    let service = BotService::new(catalog, transport, &config);

    println!("{}", "=========================================".blue());
    println!("{}", "          reelbot interactive chat       ".blue().bold());
    println!("{}", "=========================================".blue());
    println!("Catalog: {}", args.catalog_path.display().to_string().yellow());
    println!(
        "User:    {}{}",
        args.user_id.green(),
        if args.admin { " (admin)".red().to_string() } else { String::new() }
    );
    println!("{}", "Send a movie name to look it up.".dimmed());
    println!(
        "{}",
        "/upload <handle> [name|quality] simulates an admin file upload.".dimmed()
    );
    println!("{}", "Type 'exit' or 'quit' to stop.".dimmed());
    println!("{}", "=========================================".blue());

    loop {
        print!("{} ", "you>".cyan().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        if line == "/upload" || line.starts_with("/upload ") {
            let rest = line["/upload".len()..].trim();
            let mut parts = rest.splitn(2, ' ');
            let handle = parts.next().unwrap_or("").trim();
            let caption = parts.next().map(str::trim);
            if handle.is_empty() {
                println!(
                    "{} usage: /upload <handle> [name|quality]",
                    "bot>".green().bold()
                );
                continue;
            }
            service
                .handle_upload(&args.user_id, handle, caption, args.admin)
                .await?;
            continue;
        }

        service
            .handle_message(&args.user_id, line, args.admin)
            .await?;
    }

    Ok(())
}
