// tests/startup_gate.rs
use std::process::{Child, Command};
use std::time::{Duration, Instant};

#[test]
fn test_binary_exits_nonzero_when_dependencies_are_unconfigured() {
    let output = Command::new(env!("CARGO_BIN_EXE_service-status"))
        .env_remove("POSTGRES_HOST")
        .env_remove("REDIS_HOST")
        .env_remove("STATUS_PROBE_FAILURE_POLICY")
        .env("STATUS_CONNECT_TIMEOUT_SECS", "1")
        .env("STATUS_BIND_ADDR", "127.0.0.1:0")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run service-status binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("FATAL: Application startup failed"));
    assert!(stderr.contains("PostgreSQL: missing setting POSTGRES_HOST"));
    assert!(stderr.contains("Redis: missing setting REDIS_HOST"));
}

/// Kills the child when the test ends, pass or fail.
struct Running(Child);

impl Drop for Running {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_fail_open_policy_lets_binary_serve() {
    let port = free_port();
    let _child = Running(
        Command::new(env!("CARGO_BIN_EXE_service-status"))
            .env_remove("POSTGRES_HOST")
            .env_remove("REDIS_HOST")
            .env("STATUS_PROBE_FAILURE_POLICY", "fail_open")
            .env("STATUS_BIND_ADDR", format!("127.0.0.1:{}", port))
            .env("RUST_LOG", "off")
            .spawn()
            .expect("failed to run service-status binary"),
    );

    let url = format!("http://127.0.0.1:{}/api/status", port);
    let deadline = Instant::now() + Duration::from_secs(10);
    let response = loop {
        match reqwest::get(&url).await {
            Ok(response) => break response,
            Err(_) if Instant::now() < deadline => {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Err(err) => panic!("server never came up on {}: {}", url, err),
        }
    };

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    for name in ["PostgreSQL", "Redis"] {
        assert_eq!(body["services"][name]["outcome"], "OK");
        let detail = body["services"][name]["detail"].as_str().unwrap();
        assert!(detail.starts_with("unverified: missing setting"), "{}", detail);
    }
}
