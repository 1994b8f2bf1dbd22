//! `explore`: command-line client for the explore "liked you" API.
//!
//! # Usage
//!
//! ```text
//! explore liked-you r1
//! explore new-liked-you r1 --token <TOKEN>
//! explore count r1
//! explore decide a4 r1 --like
//! explore --url http://staging:50051 count r1
//! ```

mod client;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use client::ApiClient;
use serde::Serialize;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "explore", about = "Client for the explore \"liked you\" API")]
struct Args {
  /// Base URL of the explore server.
  #[arg(long, env = "EXPLORE_URL", default_value = "http://localhost:50051")]
  url: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List everyone who liked RECIPIENT, newest first.
  LikedYou {
    recipient: String,
    /// Pagination token from a previous page.
    #[arg(long)]
    token:     Option<String>,
  },
  /// List likers RECIPIENT has not liked back.
  NewLikedYou {
    recipient: String,
    #[arg(long)]
    token:     Option<String>,
  },
  /// Count everyone who liked RECIPIENT.
  Count { recipient: String },
  /// Record ACTOR's decision about RECIPIENT.
  #[command(group(ArgGroup::new("verdict").required(true).args(["like", "pass"])))]
  Decide {
    actor:     String,
    recipient: String,
    #[arg(long)]
    like:      bool,
    #[arg(long)]
    pass:      bool,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let client = ApiClient::new(args.url)?;

  match args.command {
    Command::LikedYou { recipient, token } => {
      print_json(&client.list_liked_you(&recipient, token, false).await?)
    }
    Command::NewLikedYou { recipient, token } => {
      print_json(&client.list_liked_you(&recipient, token, true).await?)
    }
    Command::Count { recipient } => print_json(&client.count_liked_you(&recipient).await?),
    Command::Decide { actor, recipient, like, .. } => {
      print_json(&client.put_decision(&actor, &recipient, like).await?)
    }
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  let out = serde_json::to_string_pretty(value).context("serialising response")?;
  println!("{out}");
  Ok(())
}
