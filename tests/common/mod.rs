#![allow(dead_code)]

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use mbo_console::client::ApiClient;
use mbo_console::credentials::CredentialStore;
use mbo_console::devserver::{DevServer, DevServerConfig};
use mbo_console::model::AppConfig;
use mbo_console::session::{NavigationHistory, SessionController, SessionService};
use mbo_console::store::KeyValueStorage;

pub async fn spawn_server() -> Result<DevServer> {
    DevServer::spawn(DevServerConfig::default()).await
}

/// A fully wired session stack pointed at one backend.
pub struct Session {
    pub controller: Arc<SessionController>,
    pub client: ApiClient,
    pub credentials: CredentialStore,
    pub history: Arc<NavigationHistory>,
}

impl Session {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_credentials(base_url, CredentialStore::in_memory())
    }

    pub fn with_storage(base_url: &str, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        Self::with_credentials(base_url, CredentialStore::new(storage))
    }

    fn with_credentials(base_url: &str, credentials: CredentialStore) -> Result<Self> {
        let mut cfg = AppConfig::new(base_url);
        cfg.request_timeout_secs = 10;
        let client = ApiClient::new(&cfg).context("build client")?;
        let service = SessionService::attach(client.clone(), credentials.clone());
        let history = Arc::new(NavigationHistory::new());
        let controller = SessionController::new(service, history.clone());
        let _ = controller.listen();
        controller.restore();
        Ok(Self {
            controller,
            client,
            credentials,
            history,
        })
    }
}

/// Polls until `cond` holds; state changes driven by session events land
/// on a background task.
pub async fn wait_until(what: &str, mut cond: impl FnMut() -> bool) -> Result<()> {
    let start = Instant::now();
    while !cond() {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}

pub struct ServerGuard {
    pub base_url: String,
    _dir: tempfile::TempDir,
    child: Child,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Runs the `mbo-dev-server` binary on an ephemeral port.
pub fn spawn_server_process() -> Result<ServerGuard> {
    let dir = tempfile::tempdir().context("create server tempdir")?;
    let addr_file = dir.path().join("addr.txt");

    let child = Command::new(env!("CARGO_BIN_EXE_mbo-dev-server"))
        .args(["--addr", "127.0.0.1:0", "--addr-file"])
        .arg(&addr_file)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("spawn mbo-dev-server")?;

    let base_url = read_addr_file(&addr_file)?;
    Ok(ServerGuard {
        base_url,
        _dir: dir,
        child,
    })
}

fn read_addr_file(addr_file: &Path) -> Result<String> {
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("addr file not written at {}", addr_file.display());
        }

        if let Ok(s) = std::fs::read_to_string(addr_file) {
            let s = s.trim();
            if !s.is_empty() {
                return Ok(format!("http://{}", s));
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
}

pub fn run_mbo(home: &Path, args: &[&str]) -> Result<String> {
    let out = mbo_command(home, args)
        .output()
        .with_context(|| format!("run mbo {:?}", args))?;

    if !out.status.success() {
        anyhow::bail!(
            "mbo {:?} failed (status {:?})\nstdout:\n{}\nstderr:\n{}",
            args,
            out.status,
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        );
    }

    Ok(String::from_utf8_lossy(&out.stdout).to_string())
}

/// Like [`run_mbo`] but expects failure and returns stderr.
pub fn run_mbo_err(home: &Path, args: &[&str]) -> Result<String> {
    let out = mbo_command(home, args)
        .output()
        .with_context(|| format!("run mbo {:?}", args))?;
    if out.status.success() {
        anyhow::bail!(
            "mbo {:?} unexpectedly succeeded\nstdout:\n{}",
            args,
            String::from_utf8_lossy(&out.stdout)
        );
    }
    Ok(String::from_utf8_lossy(&out.stderr).to_string())
}

fn mbo_command(home: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mbo"));
    cmd.arg("--home")
        .arg(home)
        .args(args)
        .env_remove("MBO_HOME")
        .env_remove("MBO_API_URL")
        .env_remove("RUST_LOG");
    cmd
}
