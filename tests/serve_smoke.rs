use assert_cmd::prelude::*;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

fn find_free_port() -> u16 {
    TcpListener::bind(("127.0.0.1", 0))
        .expect("bind ephemeral port")
        .local_addr()
        .expect("local addr")
        .port()
}

fn wait_for_ready(client: &Client, port: u16) {
    let url = format!("http://127.0.0.1:{}/readyz", port);
    for _ in 0..60 {
        if let Ok(resp) = client.get(&url).send() {
            if resp.status().is_success() {
                return;
            }
        }
        thread::sleep(Duration::from_millis(100));
    }
    panic!("kinship server did not become ready on port {}", port);
}

struct KillOnDrop(Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

#[test]
fn serve_exposes_the_friend_graph() {
    let dir = tempfile::tempdir().unwrap();
    let port = find_free_port();

    let child = Command::cargo_bin("kinship")
        .expect("binary built")
        .args([
            "--metrics-port",
            "0",
            "--config",
            dir.path().join("config.yaml").to_str().unwrap(),
            "serve",
            "--port",
            &port.to_string(),
            "--data-file",
            dir.path().join("graph.json").to_str().unwrap(),
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn serve");
    let _child = KillOnDrop(child);

    let client = Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("client");
    wait_for_ready(&client, port);

    let base = format!("http://127.0.0.1:{}", port);
    let mut ids = Vec::new();
    for (name, interests) in [("carol", vec!["jazz"]), ("dave", vec!["jazz", "go"])] {
        let response = client
            .post(format!("{base}/api/users"))
            .json(&json!({
                "username": name,
                "email": format!("{name}@example.com"),
                "interests": interests,
            }))
            .send()
            .expect("register");
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().expect("json body");
        ids.push(body["user"]["id"].as_str().unwrap().to_string());
    }

    let body: Value = client
        .get(format!("{base}/api/users/{}/recommendations", ids[0]))
        .send()
        .expect("recommend")
        .json()
        .expect("json body");
    assert_eq!(body["success"], true);
    assert_eq!(body["recommendations"][0]["id"], ids[1].as_str());
    assert_eq!(body["recommendations"][0]["shared_interests"], 1);

    assert!(dir.path().join("graph.json").exists());
}
