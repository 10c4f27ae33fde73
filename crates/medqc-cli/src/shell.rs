//! Command loop of the interactive shell.
//!
//! Each data command first navigates to the view it belongs to. If the guard
//! sends the user to login instead, the command is not sent to the backend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::{debug, warn};

use medqc_core::api::quality::DEFAULT_HISTORY_LIMIT;
use medqc_core::api::summary::DEFAULT_TREND_DAYS;
use medqc_core::models::{LoginRequest, RecentIssuesQuery, RegisterRequest, ScanMetadata};
use medqc_core::router::{LOGIN_PATH, REGISTER_PATH};
use medqc_core::{ApiClient, Config, Router, View};

use crate::format;

const HELP: &str = "\
Commands:
  go <path>                         navigate (e.g. /dashboard, /issues)
  login [username]                  log in
  register                          create an account
  logout                            end the session
  whoami                            show the logged-in user
  stats                             issue statistics
  trend [days]                      daily issue trend
  distribution                      issue type distribution
  recent [page] [limit] [status]    recent issues
  predict <file> [patient] [exam]   hemorrhage detection (upload)
  predict64 <file>                  hemorrhage detection (base64)
  history [limit]                   past detections
  help                              this text
  quit                              exit";

pub struct Shell {
    api: ApiClient,
    router: Arc<Router>,
    config: Config,
    lines: Lines<BufReader<Stdin>>,
}

impl Shell {
    pub fn new(api: ApiClient, router: Arc<Router>, config: Config) -> Self {
        Self {
            api,
            router,
            config,
            lines: BufReader::new(io::stdin()).lines(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.go("/");
        println!("Type 'help' for commands.");

        loop {
            self.prompt().await?;
            let Some(line) = self.lines.next_line().await? else {
                return Ok(());
            };
            let args: Vec<&str> = line.split_whitespace().collect();
            let Some((&command, rest)) = args.split_first() else {
                continue;
            };

            let keep_going = self.dispatch(command, rest).await?;

            follow_hard_redirect(&self.api, &self.router);
            if !keep_going {
                return Ok(());
            }
        }
    }

    async fn prompt(&self) -> Result<()> {
        let view = self.router.current_view().map(|v| v.title()).unwrap_or("-");
        let user = self
            .api
            .session()
            .user()
            .filter(|_| self.api.session().is_authenticated())
            .map(|u| u.display_name().to_string());
        let mut stdout = io::stdout();
        let prompt = match user {
            Some(name) => format!("[{}] {}> ", view, name),
            None => format!("[{}]> ", view),
        };
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }

    /// Run one command. Returns false when the shell should exit.
    async fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<bool> {
        match command {
            "help" | "?" => println!("{}", HELP),
            "quit" | "exit" => return Ok(false),
            "go" => match args.first() {
                Some(path) => self.go(path),
                None => println!("Usage: go <path>"),
            },
            "login" => self.login(args.first().copied()).await?,
            "register" => self.register().await?,
            "logout" => {
                self.api.logout();
                self.go(LOGIN_PATH);
            }
            "whoami" => match self.api.session().user() {
                Some(user) if self.api.session().is_authenticated() => println!(
                    "{} ({})",
                    user.display_name(),
                    user.role.as_deref().unwrap_or("user")
                ),
                _ => println!("Not logged in"),
            },
            "stats" => {
                if self.enter("/issues", View::Issues) {
                    match self.api.summary_stats().await {
                        Ok(stats) => println!("{}", format::stats(&stats)),
                        Err(e) => self.report(&e),
                    }
                }
            }
            "trend" => {
                let days = match parse_arg(args.first(), DEFAULT_TREND_DAYS) {
                    Some(days) => days,
                    None => {
                        println!("Usage: trend [days]");
                        return Ok(true);
                    }
                };
                if self.enter("/issues", View::Issues) {
                    match self.api.issue_trend(days).await {
                        Ok(trend) => println!("{}", format::trend(&trend)),
                        Err(e) => self.report(&e),
                    }
                }
            }
            "distribution" => {
                if self.enter("/issues", View::Issues) {
                    match self.api.issue_distribution().await {
                        Ok(entries) => println!("{}", format::distribution(&entries)),
                        Err(e) => self.report(&e),
                    }
                }
            }
            "recent" => {
                let defaults = RecentIssuesQuery::default();
                let (Some(page), Some(limit)) = (
                    parse_arg(args.first(), defaults.page),
                    parse_arg(args.get(1), defaults.limit),
                ) else {
                    println!("Usage: recent [page] [limit] [status]");
                    return Ok(true);
                };
                let query = RecentIssuesQuery {
                    page,
                    limit,
                    status: args.get(2).map(|s| s.to_string()),
                    ..defaults
                };
                if self.enter("/issues", View::Issues) {
                    match self.api.recent_issues(&query).await {
                        Ok(recent) => println!("{}", format::recent(&recent)),
                        Err(e) => self.report(&e),
                    }
                }
            }
            "predict" => {
                let Some(file) = args.first() else {
                    println!("Usage: predict <file> [patient] [exam]");
                    return Ok(true);
                };
                let metadata = ScanMetadata {
                    patient_name: args.get(1).map(|s| s.to_string()),
                    exam_id: args.get(2).map(|s| s.to_string()),
                };
                if self.enter("/hemorrhage", View::Hemorrhage) {
                    let path = PathBuf::from(file);
                    match self.api.predict_hemorrhage(&path, &metadata).await {
                        Ok(p) => println!("{}", format::prediction(&p)),
                        Err(e) => self.report(&e),
                    }
                }
            }
            "predict64" => {
                let Some(file) = args.first() else {
                    println!("Usage: predict64 <file>");
                    return Ok(true);
                };
                if self.enter("/hemorrhage", View::Hemorrhage) {
                    let path = PathBuf::from(file);
                    let bytes = match tokio::fs::read(&path).await {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            println!("Cannot read {}: {}", path.display(), e);
                            return Ok(true);
                        }
                    };
                    let filename = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("scan.png");
                    match self.api.predict_hemorrhage_base64(&bytes, filename).await {
                        Ok(p) => println!("{}", format::prediction(&p)),
                        Err(e) => self.report(&e),
                    }
                }
            }
            "history" => {
                let Some(limit) = parse_arg(args.first(), DEFAULT_HISTORY_LIMIT) else {
                    println!("Usage: history [limit]");
                    return Ok(true);
                };
                if self.enter("/hemorrhage", View::Hemorrhage) {
                    match self.api.hemorrhage_history(limit).await {
                        Ok(records) => println!("{}", format::history(&records)),
                        Err(e) => self.report(&e),
                    }
                }
            }
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }
        Ok(true)
    }

    fn go(&self, path: &str) {
        go(&self.router, path);
    }

    fn enter(&self, path: &str, expected: View) -> bool {
        enter(&self.router, path, expected)
    }

    fn report(&self, err: &medqc_core::ApiError) {
        warn!(error = %err, "Command failed");
        println!("{}", format::describe_error(err));
    }

    async fn login(&mut self, username: Option<&str>) -> Result<()> {
        if self.api.session().is_authenticated() {
            println!("Already logged in; use 'logout' first");
            return Ok(());
        }
        self.go(LOGIN_PATH);

        let username = match username.map(str::to_string).or_else(|| self.config.last_username.clone()) {
            Some(name) => name,
            None => self.ask("Username: ").await?,
        };
        let password = read_password("Password: ").await?;

        match self.api.login(&LoginRequest::new(&username, password)).await {
            Ok(resp) => {
                println!("Welcome, {}", resp.user.display_name());
                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.go("/");
            }
            Err(e) => self.report(&e),
        }
        Ok(())
    }

    async fn register(&mut self) -> Result<()> {
        self.go(REGISTER_PATH);
        if self.router.current_view() != Some(View::Register) {
            println!("Already logged in; use 'logout' first");
            return Ok(());
        }

        let username = self.ask("Username: ").await?;
        let email = self.ask("Email: ").await?;
        let password = read_password("Password: ").await?;
        let full_name = non_empty(self.ask("Full name (optional): ").await?);
        let hospital = non_empty(self.ask("Hospital (optional): ").await?);
        let department = non_empty(self.ask("Department (optional): ").await?);

        let request = RegisterRequest {
            username,
            email,
            password,
            full_name,
            hospital,
            department,
        };
        match self.api.register(&request).await {
            Ok(resp) => {
                println!("{}", resp.message);
                self.go(LOGIN_PATH);
            }
            Err(e) => self.report(&e),
        }
        Ok(())
    }

    async fn ask(&mut self, question: &str) -> Result<String> {
        let mut stdout = io::stdout();
        stdout.write_all(question.as_bytes()).await?;
        stdout.flush().await?;
        let line = self
            .lines
            .next_line()
            .await?
            .context("Input closed")?;
        Ok(line.trim().to_string())
    }
}

fn go(router: &Router, path: &str) {
    match router.navigate(path) {
        Ok(view) => debug!(view = view.title(), "View changed"),
        Err(e) => println!("Navigation failed: {}", e),
    }
}

/// Navigate to `path` and report whether `expected` is now shown.
fn enter(router: &Router, path: &str, expected: View) -> bool {
    go(router, path);
    if router.current_view() == Some(expected) {
        true
    } else {
        println!("Login required");
        false
    }
}

/// Apply a redirect the pipeline recorded while no navigator was attached.
fn follow_hard_redirect(api: &ApiClient, router: &Router) -> Option<String> {
    let path = api.take_hard_redirect()?;
    debug!(path = %path, "Applying hard redirect");
    go(router, &path);
    Some(path)
}

/// Prompt for a password without echo. rpassword blocks, so it runs off the
/// async workers.
async fn read_password(prompt: &'static str) -> Result<String> {
    tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt))
        .await
        .context("Password prompt task failed")?
        .context("Failed to read password")
}

/// Parse an optional positional argument, falling back to `default` when absent.
/// Returns None when the argument is present but not a number.
fn parse_arg(arg: Option<&&str>, default: u32) -> Option<u32> {
    match arg {
        Some(raw) => raw.parse().ok(),
        None => Some(default),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use medqc_core::auth::UserInfo;
    use medqc_core::{MemoryStorage, PipelineConfig, SessionStore};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn session() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStorage::new()))
    }

    /// Answers a single request with 401 and closes the connection.
    async fn spawn_rejecting_backend() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await
                .unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_enter_is_refused_when_logged_out() {
        let router = Router::new(session());

        assert!(!enter(&router, "/issues", View::Issues));
        assert_eq!(router.current_view(), Some(View::Login));
    }

    #[test]
    fn test_enter_shows_view_when_logged_in() {
        let session = session();
        session.set_session("tok", &UserInfo::new("zhang"));
        let router = Router::new(session);

        assert!(enter(&router, "/hemorrhage", View::Hemorrhage));
        assert_eq!(router.current_view(), Some(View::Hemorrhage));
    }

    #[test]
    fn test_no_hard_redirect_leaves_view() {
        let session = session();
        session.set_session("tok", &UserInfo::new("zhang"));
        let api = ApiClient::new(PipelineConfig::default(), session.clone()).unwrap();
        let router = Router::new(session);
        go(&router, "/issues");

        assert_eq!(follow_hard_redirect(&api, &router), None);
        assert_eq!(router.current_view(), Some(View::Issues));
    }

    #[tokio::test]
    async fn test_hard_redirect_after_401_lands_on_login() {
        let origin = spawn_rejecting_backend().await;
        let session = session();
        session.set_session("tok", &UserInfo::new("zhang"));
        let config = PipelineConfig::new(&origin, Duration::from_secs(5));
        // No navigator attached, so the pipeline can only record the redirect
        let api = ApiClient::new(config, session.clone()).unwrap();
        let router = Router::new(session);
        assert!(enter(&router, "/issues", View::Issues));

        let err = api.summary_stats().await.unwrap_err();
        assert!(matches!(err, medqc_core::ApiError::AuthExpired));

        assert_eq!(follow_hard_redirect(&api, &router).as_deref(), Some(LOGIN_PATH));
        assert_eq!(router.current_view(), Some(View::Login));
        assert_eq!(follow_hard_redirect(&api, &router), None);
    }

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg(None, 7), Some(7));
        assert_eq!(parse_arg(Some(&"30"), 7), Some(30));
        assert_eq!(parse_arg(Some(&"week"), 7), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(String::new()), None);
        assert_eq!(non_empty("ICU".to_string()), Some("ICU".to_string()));
    }
}
