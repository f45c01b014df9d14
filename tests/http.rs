// tests/http.rs

//! End-to-end runs against an in-process axum app that mimics the signup page
//! and the username check endpoint.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::Router;
use github_username_checker_lib::{
    fetch_token, CheckerConfig, CheckerError, HttpProber, PipelineConfig, ProbeResult, Prober,
    Session, UsernameChecker,
};
use tokio::net::TcpListener;

const TOKEN: &str = "tok+EN/123==";
const COOKIE: &str = "_gh_sess=fixture-session";

fn signup_page(token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><body>
  <form action="/signup" method="post">
    <auto-check src="/signup_check/username" required>
      <input type="text" name="user[login]" id="login">
      <input type="hidden" data-csrf="true" value="{token}">
    </auto-check>
  </form>
</body></html>"#
    )
}

struct FakeGithub {
    signup_page: String,
    free: HashSet<String>,
    checks: AtomicUsize,
    checks_with_cookie: AtomicUsize,
}

impl FakeGithub {
    fn new(signup_page: String, free: &[&str]) -> Arc<Self> {
        Arc::new(FakeGithub {
            signup_page,
            free: free.iter().map(|s| s.to_string()).collect(),
            checks: AtomicUsize::new(0),
            checks_with_cookie: AtomicUsize::new(0),
        })
    }

    /// Serve the fixture on an ephemeral loopback port.
    async fn start(self: &Arc<Self>) -> SocketAddr {
        let app = Router::new()
            .route("/signup", get(signup))
            .route("/signup_check/username", post(check_username))
            .with_state(Arc::clone(self));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }
}

async fn signup(State(github): State<Arc<FakeGithub>>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, format!("{COOKIE}; Path=/"))],
        Html(github.signup_page.clone()),
    )
}

async fn check_username(
    State(github): State<Arc<FakeGithub>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> String {
    github.checks.fetch_add(1, Ordering::SeqCst);

    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookies| cookies.contains(COOKIE));
    if has_cookie {
        github.checks_with_cookie.fetch_add(1, Ordering::SeqCst);
    }

    let mut token = None;
    let mut value = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_owned);
        let text = field.text().await.unwrap_or_default();
        match name.as_deref() {
            Some("authenticity_token") => token = Some(text),
            Some("value") => value = Some(text),
            _ => {}
        }
    }

    if token.as_deref() != Some(TOKEN) {
        return "Invalid authenticity token".to_string();
    }
    match value {
        Some(name) if github.free.contains(&name) => format!("{name} is available."),
        Some(name) => format!("Username {name} is unavailable."),
        None => "Missing value".to_string(),
    }
}

fn session_for(addr: SocketAddr) -> Session {
    Session::new(&format!("http://{addr}/"), Duration::from_secs(5), 8).unwrap()
}

fn checker_config(input: &Path, output_dir: &Path, addr: SocketAddr) -> CheckerConfig {
    CheckerConfig {
        input: input.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        base_url: format!("http://{addr}/"),
        timeout: Duration::from_secs(5),
        skip_blank: false,
        pipeline: PipelineConfig {
            workers: 4,
            poll_interval: Duration::from_millis(10),
            grace: Duration::from_millis(500),
        },
    }
}

fn files_in(dir: &Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn token_is_read_from_signup_page() {
    let server = FakeGithub::new(signup_page(TOKEN), &[]);
    let addr = server.start().await;

    let token = fetch_token(&session_for(addr)).await.unwrap();
    assert_eq!(token.as_str(), TOKEN);
}

#[tokio::test]
async fn http_checks_classify_live_responses() {
    let server = FakeGithub::new(signup_page(TOKEN), &["free-name"]);
    let addr = server.start().await;

    let session = Arc::new(session_for(addr));
    let token = fetch_token(&session).await.unwrap();
    let prober = HttpProber::new(Arc::clone(&session), token);

    assert_eq!(prober.probe("free-name").await, ProbeResult::Available);
    assert_eq!(prober.probe("taken-name").await, ProbeResult::Unavailable);
    assert_eq!(server.checks.load(Ordering::SeqCst), 2);
    // The signup cookie is carried on every check through the shared session.
    assert_eq!(server.checks_with_cookie.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unreachable_endpoint_is_indeterminate() {
    // Bind then drop to get a port nobody is listening on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let prober = HttpProber::new(
        Arc::new(session_for(addr)),
        github_username_checker_lib::Token::new("unused"),
    );

    assert_eq!(prober.probe("anyone").await, ProbeResult::Indeterminate);
}

#[tokio::test]
async fn full_run_writes_available_names() {
    let server = FakeGithub::new(signup_page(TOKEN), &["freeuser123"]);
    let addr = server.start().await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("names.txt");
    std::fs::write(&input, "freeuser123\ntakenuser\nfreeuser123\n").unwrap();
    let output_dir = dir.path().join("usernames");

    let checker = UsernameChecker::new(checker_config(&input, &output_dir, addr)).unwrap();
    let report = checker.run().await.unwrap();

    assert_eq!(report.summary.checked, 3);
    assert_eq!(report.summary.available, 2);
    assert_eq!(server.checks.load(Ordering::SeqCst), 3);

    assert!(report.output_file.starts_with(&output_dir));
    let file_name = report.output_file.file_name().unwrap().to_string_lossy();
    assert!(file_name.starts_with("usernames-") && file_name.ends_with(".txt"));

    let content = std::fs::read_to_string(&report.output_file).unwrap();
    assert_eq!(
        content,
        "Username 'freeuser123' is available!\nUsername 'freeuser123' is available!\n"
    );
}

#[tokio::test]
async fn missing_token_aborts_before_any_check() {
    let server = FakeGithub::new(
        "<html><body><p>We moved the signup form.</p></body></html>".to_string(),
        &["freeuser123"],
    );
    let addr = server.start().await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("names.txt");
    std::fs::write(&input, "freeuser123\ntakenuser\n").unwrap();
    let output_dir = dir.path().join("usernames");

    let checker = UsernameChecker::new(checker_config(&input, &output_dir, addr)).unwrap();
    let result = checker.run().await;

    assert!(matches!(result, Err(CheckerError::TokenNotFound)));
    assert_eq!(server.checks.load(Ordering::SeqCst), 0);
    // The directory is prepared up front, but no results file is opened.
    assert!(output_dir.is_dir());
    assert!(files_in(&output_dir).is_empty());
}

#[tokio::test]
async fn empty_input_file_checks_nothing() {
    let server = FakeGithub::new(signup_page(TOKEN), &[]);
    let addr = server.start().await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.txt");
    std::fs::write(&input, "").unwrap();
    let output_dir = dir.path().join("usernames");

    let checker = UsernameChecker::new(checker_config(&input, &output_dir, addr)).unwrap();
    let report = tokio::time::timeout(Duration::from_secs(5), checker.run())
        .await
        .expect("empty run should finish promptly")
        .unwrap();

    assert_eq!(report.summary.checked, 0);
    assert_eq!(server.checks.load(Ordering::SeqCst), 0);
    assert_eq!(std::fs::read_to_string(&report.output_file).unwrap(), "");
}

#[tokio::test]
async fn output_directory_may_already_exist() {
    let server = FakeGithub::new(signup_page(TOKEN), &["x"]);
    let addr = server.start().await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("names.txt");
    std::fs::write(&input, "x\n").unwrap();
    let output_dir = dir.path().join("usernames");
    std::fs::create_dir_all(&output_dir).unwrap();

    let checker = UsernameChecker::new(checker_config(&input, &output_dir, addr)).unwrap();
    let report = checker.run().await.unwrap();

    assert_eq!(report.summary.available, 1);
}
