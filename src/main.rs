use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli_exec;

#[derive(Parser)]
#[command(name = "mbo")]
#[command(about = "MBO dealership console", long_about = None)]
struct Cli {
    /// Directory holding `.mbo` (defaults to $MBO_HOME, then the current directory)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize console configuration (.mbo)
    Init {
        /// Backend base URL
        #[arg(long)]
        url: String,
        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Re-initialize if .mbo already exists
        #[arg(long)]
        force: bool,
    },

    /// Show console configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out (local session is cleared even if the backend is unreachable)
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Obtain a new access token using the stored refresh cookie
    Refresh,

    /// Create an account (does not sign in)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Role name, e.g. outlet_manager
        #[arg(long)]
        role: String,
        #[arg(long)]
        dealership: String,
        #[arg(long)]
        outlet: Option<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether the signed-in user holds a permission
    Can {
        /// resource:action:scope
        permission: String,
    },

    /// List the navigation entries the signed-in user may open
    Routes {
        /// Dealer id (defaults to the user's dealership)
        #[arg(long)]
        dealer: Option<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what the route guard decides for a path
    Check {
        path: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage roles
    Roles {
        #[command(subcommand)]
        command: RoleCommands,
    },

    /// Browse MBO outlets
    Outlets {
        #[command(subcommand)]
        command: OutletCommands,
    },

    /// Browse dealerships
    Dealerships {
        #[command(subcommand)]
        command: DealershipCommands,
    },

    /// Authenticated GET of a raw backend path
    Get {
        /// Path relative to the base URL, e.g. /users/u-1
        path: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show configuration
    Show {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = mbo_console::resources::DEFAULT_PAGE_SIZE)]
    page_size: u32,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List(PageArgs),
    /// Show a user
    Get {
        id: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RoleCommands {
    /// List roles
    List {
        #[command(flatten)]
        page: PageArgs,
        /// Include each role's permissions
        #[arg(long)]
        permissions: bool,
    },
    /// Show a role
    Get {
        id: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum OutletCommands {
    /// List MBO outlets
    List(PageArgs),
    /// Show an outlet
    Get {
        id: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum DealershipCommands {
    /// List dealerships
    List(PageArgs),
    /// Show a dealership
    Get {
        id: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli_exec::handle_command(cli.home, cli.command).await
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
