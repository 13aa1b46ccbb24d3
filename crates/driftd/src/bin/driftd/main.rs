mod bootstrap;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::task::LocalSet;

#[derive(Parser, Debug)]
#[command(name = "driftd", about = "opportunistic notification relay")]
struct Args {
    #[arg(long, default_value = "drift.sqlite3")]
    store: PathBuf,
    #[arg(long)]
    identity: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print this node's own hashed address.
    Identity,
    /// Send a message to a hex-encoded hashed address.
    Send { to: String, message: String },
    /// List notifications addressed to this node.
    Inbox,
    /// List known contact addresses.
    Contacts,
    /// Run two in-process engines over a loopback link and show what
    /// each side ends up with, for exercising a strategy locally.
    Demo { message: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    let local = LocalSet::new();
    local
        .run_until(async {
            let args = Args::parse();
            run(args);
        })
        .await;
}

fn run(args: Args) {
    let context = match bootstrap::bootstrap(&args.store, args.identity.as_deref(), args.config.as_deref()) {
        Ok(context) => context,
        Err(err) => {
            eprintln!("driftd: {err}");
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Command::Identity => commands::identity(&context),
        Command::Send { to, message } => commands::send(context, &to, message),
        Command::Inbox => commands::inbox(&context),
        Command::Contacts => commands::contacts(&context),
        Command::Demo { message } => commands::demo(context, message),
    };

    if let Err(err) = result {
        eprintln!("driftd: {err}");
        std::process::exit(1);
    }
}
