use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct ViewResponse {
    view: String,
}

#[derive(Debug, Deserialize)]
struct StagedResponse {
    preview: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TaskCard {
    index: usize,
    name: String,
    start: String,
    end: String,
    status: String,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct Dashboard {
    welcome: String,
    day_number: i64,
    tasks: Vec<TaskCard>,
}

#[derive(Debug, Deserialize)]
struct ClockDisplay {
    weekday: String,
    date: String,
    time: String,
}

struct TestServer {
    base_url: String,
    data_path: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_quest_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/view")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server_at(data_path: String) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_habit_quest"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("APP_CLOCK_INTERVAL_MS", "50")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_path,
        child,
    }
}

async fn spawn_server() -> TestServer {
    spawn_server_at(unique_data_path()).await
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = spawn_server().await;
    #[cfg(unix)]
    cleanup::register(server.child.id());
    let server = Arc::new(server);
    *guard = Some(Arc::clone(&server));
    server
}

async fn view(client: &Client, base_url: &str) -> String {
    let response: ViewResponse = client
        .get(format!("{base_url}/api/view"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    response.view
}

async fn post_json(
    client: &Client,
    url: String,
    body: serde_json::Value,
) -> (StatusCode, String) {
    let response = client.post(url).json(&body).send().await.unwrap();
    let status = response.status();
    (status, response.text().await.unwrap())
}

fn no_body() -> serde_json::Value {
    serde_json::json!({})
}

#[tokio::test]
async fn http_clock_reports_weekday_date_and_time() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let clock: ClockDisplay = client
        .get(format!("{}/api/clock", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(clock.weekday.ends_with("day"));
    assert_eq!(clock.date.len(), 10);
    assert!(clock.time.ends_with("AM") || clock.time.ends_with("PM"));
}

#[tokio::test]
async fn http_permission_answer_is_recorded() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let (status, body) = post_json(
        &client,
        format!("{}/api/notifications/permission", server.base_url),
        serde_json::json!({ "state": "granted" }),
    )
    .await;
    assert!(status.is_success());
    assert_eq!(body, r#""granted""#);

    let (status, _) = post_json(
        &client,
        format!("{}/api/notifications/permission", server.base_url),
        serde_json::json!({ "state": "sometimes" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let pending: Vec<serde_json::Value> = client
        .get(format!("{}/api/notifications", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn http_setup_flow_reaches_dashboard() {
    let server = spawn_server().await;
    let client = Client::new();
    let base = server.base_url.as_str();

    assert_eq!(view(&client, base).await, "capture_profile");

    let (status, body) = post_json(
        &client,
        format!("{base}/api/profile"),
        serde_json::json!({ "name": "Ann", "age": "30", "email": "  " }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "All user details are required");
    assert_eq!(view(&client, base).await, "capture_profile");

    let (status, body) = post_json(
        &client,
        format!("{base}/api/profile"),
        serde_json::json!({ "name": "Ann", "age": "30", "email": "a@b.com" }),
    )
    .await;
    assert!(status.is_success());
    assert_eq!(body, r#"{"view":"setup_tasks"}"#);

    let (status, _) = post_json(
        &client,
        format!("{base}/api/profile"),
        serde_json::json!({ "name": "Bob", "age": "40", "email": "b@c.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = post_json(&client, format!("{base}/api/tasks/commit"), no_body()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Add at least one task");

    let (status, body) = post_json(
        &client,
        format!("{base}/api/tasks/stage"),
        serde_json::json!({ "name": "Read", "start": "09:00", "end": "09:00" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "End time must be after start time");

    let staged: StagedResponse = client
        .post(format!("{base}/api/tasks/stage"))
        .json(&serde_json::json!({ "name": "Read", "start": "09:00", "end": "10:00" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(staged.preview, vec!["Read — 09:00 to 10:00".to_string()]);

    let (status, body) = post_json(&client, format!("{base}/api/tasks/commit"), no_body()).await;
    assert!(status.is_success());
    assert_eq!(body, r#"{"view":"dashboard"}"#);

    let dashboard: Dashboard = client
        .get(format!("{base}/api/dashboard"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard.welcome, "Welcome Ann");
    assert_eq!(dashboard.day_number, 1);
    assert_eq!(dashboard.tasks.len(), 1);
    let task = &dashboard.tasks[0];
    assert_eq!((task.index, task.name.as_str()), (0, "Read"));
    assert_eq!((task.start.as_str(), task.end.as_str()), ("09:00", "10:00"));
    assert!(!task.done);
    assert_ne!(task.status, "completed");

    let done: Dashboard = client
        .post(format!("{base}/api/tasks/0/done"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(done.tasks[0].done);
    assert_eq!(done.tasks[0].status, "completed");

    let (status, body) = post_json(&client, format!("{base}/api/tasks/5/done"), no_body()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Unknown task");

    let page = client.get(format!("{base}/")).send().await.unwrap().text().await.unwrap();
    assert!(page.contains("Welcome Ann"));
    assert!(page.contains("task-completed"));
}

#[tokio::test]
async fn http_state_survives_restart() {
    let data_path = unique_data_path();
    {
        let server = spawn_server_at(data_path.clone()).await;
        let client = Client::new();
        let base = server.base_url.as_str();

        let response = client
            .post(format!("{base}/profile"))
            .form(&[("name", "Ann"), ("age", "30"), ("email", "a@b.com")])
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        let page = response.text().await.unwrap();
        assert!(page.contains(r#"<section id="task-setup-box" >"#));

        let response = client
            .post(format!("{base}/tasks/stage"))
            .form(&[("name", "Walk"), ("start", "18:00"), ("end", "19:00")])
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert!(response.text().await.unwrap().contains("Walk — 18:00 to 19:00"));

        let response = client.post(format!("{base}/tasks/commit")).send().await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(server.data_path, data_path);
    }

    let stored = std::fs::read_to_string(&data_path).unwrap();
    assert!(stored.contains("taskList"));
    assert!(stored.contains("trackingStartDate"));

    let server = spawn_server_at(data_path.clone()).await;
    let client = Client::new();
    assert_eq!(view(&client, &server.base_url).await, "dashboard");
    drop(server);
    std::fs::remove_file(&data_path).ok();
}
