use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use mbo_console::client::ApiClient;
use mbo_console::credentials::CredentialStore;
use mbo_console::model::AppConfig;
use mbo_console::session::{NavigationHistory, SessionController, SessionService};
use mbo_console::store::{ConsoleHome, FileStorage, KeyValueStorage};

use crate::{Commands, ConfigCommands};

mod access;
mod resources;
mod session;

const HOME_ENV: &str = "MBO_HOME";
const API_URL_ENV: &str = "MBO_API_URL";

/// Where the process keeps the backend's cookies between invocations.
const COOKIE_JAR_KEY: &str = "cookie_jar";

pub(crate) async fn handle_command(home: Option<PathBuf>, command: Commands) -> Result<()> {
    let base = resolve_base(home)?;

    match command {
        Commands::Init {
            url,
            timeout_secs,
            force,
        } => {
            let mut cfg = AppConfig::new(&url);
            if let Some(secs) = timeout_secs {
                cfg.request_timeout_secs = secs;
            }
            let home = ConsoleHome::init(&base, &cfg, force)?;
            println!("Initialized console at {}", home.root().display());
        }
        Commands::Config {
            command: ConfigCommands::Show { json },
        } => {
            let home = ConsoleHome::open(&base)?;
            let cfg = effective_config(&home)?;
            if json {
                print_json(&cfg, "config")?;
            } else {
                println!("url: {}", cfg.base_url);
                println!("timeout: {}s", cfg.request_timeout_secs);
                println!("home: {}", home.root().display());
            }
        }
        other => {
            let console = Console::open(&base)?;
            let outcome = dispatch(&console, other).await;
            console.save_cookies()?;
            outcome?;
        }
    }
    Ok(())
}

async fn dispatch(console: &Console, command: Commands) -> Result<()> {
    match command {
        Commands::Init { .. } | Commands::Config { .. } => {
            anyhow::bail!("command does not run inside a session")
        }
        Commands::Login {
            email,
            password,
            json,
        } => session::login(console, &email, &password, json).await,
        Commands::Logout => session::logout(console).await,
        Commands::Whoami { json } => session::whoami(console, json),
        Commands::Refresh => session::refresh(console).await,
        Commands::Register {
            name,
            email,
            password,
            role,
            dealership,
            outlet,
            json,
        } => {
            let req = mbo_console::model::RegisterRequest {
                name,
                email,
                password,
                role_name: role,
                dealership_id: dealership,
                outlet_id: outlet,
            };
            session::register(console, &req, json).await
        }
        Commands::Can { permission } => access::can(console, &permission),
        Commands::Routes { dealer, json } => access::routes(console, dealer, json),
        Commands::Check { path, json } => access::check(console, &path, json),
        Commands::Users { command } => resources::users(console, command).await,
        Commands::Roles { command } => resources::roles(console, command).await,
        Commands::Outlets { command } => resources::outlets(console, command).await,
        Commands::Dealerships { command } => resources::dealerships(console, command).await,
        Commands::Get { path } => resources::raw_get(console, &path).await,
    }
}

fn resolve_base(home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = home {
        return Ok(home);
    }
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    std::env::current_dir().context("get current dir")
}

fn effective_config(home: &ConsoleHome) -> Result<AppConfig> {
    let mut cfg = home.read_config()?;
    if let Ok(url) = std::env::var(API_URL_ENV)
        && !url.trim().is_empty()
    {
        cfg.base_url = url.trim().trim_end_matches('/').to_string();
    }
    Ok(cfg)
}

/// One CLI invocation's view of the session: the persisted credentials,
/// a client carrying the saved cookies, and a restored controller.
pub(super) struct Console {
    storage: Arc<FileStorage>,
    controller: Arc<SessionController>,
    history: Arc<NavigationHistory>,
}

impl Console {
    fn open(base: &Path) -> Result<Self> {
        let home = ConsoleHome::open(base)?;
        let cfg = effective_config(&home)?;
        let storage = Arc::new(home.storage());

        let client = ApiClient::new(&cfg)?;
        if let Some(jar) = storage.get(COOKIE_JAR_KEY)? {
            client.restore_cookies(&jar).context("restore cookie jar")?;
        }

        let credentials = CredentialStore::new(storage.clone());
        let service = SessionService::attach(client, credentials);
        let history = Arc::new(NavigationHistory::new());
        let controller = SessionController::new(service, history.clone());
        controller.restore();
        let _ = controller.listen();

        Ok(Self {
            storage,
            controller,
            history,
        })
    }

    pub(super) fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    pub(super) fn client(&self) -> &ApiClient {
        self.controller.service().client()
    }

    pub(super) fn history(&self) -> &NavigationHistory {
        &self.history
    }

    fn save_cookies(&self) -> Result<()> {
        let saved = match self.client().cookie_header() {
            Some(jar) => self.storage.set(COOKIE_JAR_KEY, jar),
            None => self.storage.remove(COOKIE_JAR_KEY),
        };
        saved.context("save cookie jar")
    }
}

pub(super) fn print_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).with_context(|| format!("serialize {} json", what))?
    );
    Ok(())
}
