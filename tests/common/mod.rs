use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Integration tests need a reachable Postgres. Skip cleanly when the
/// environment does not provide one.
pub fn database_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cohort-tools-api"));
        cmd.env("PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL and
        // COHORT_TOOLS_DB from .env (loaded by the server)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Minimal valid cohort payload with a unique slug.
pub fn cohort_payload(tag: &str) -> serde_json::Value {
    serde_json::json!({
        "cohortSlug": format!("ft-wd-{}", tag),
        "cohortName": format!("FT WD {}", tag),
        "program": "Web Dev",
        "format": "Full Time",
        "campus": "Madrid",
        "inProgress": false,
        "totalHours": 360
    })
}

/// Minimal valid student payload with a unique email.
pub fn student_payload(tag: &str) -> serde_json::Value {
    serde_json::json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": format!("ada+{}@example.com", tag),
        "languages": ["English"]
    })
}

/// Fresh tag for payload uniqueness across parallel tests.
pub fn unique_tag() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
