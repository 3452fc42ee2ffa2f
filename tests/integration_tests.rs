//! HTTP integration tests against a live server on an ephemeral port

use nightscape::server::{CityscapeServer, Environment, RunningServer, ServerConfig};

fn start_server(environment: Environment) -> (RunningServer, String) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment,
        workers: 2,
    };
    let running = CityscapeServer::bind(config)
        .expect("bind")
        .spawn()
        .expect("spawn");
    let addr = running.local_addr().expect("ip listener");
    (running, format!("http://{}", addr))
}

fn decode(png_data: &[u8]) -> (u32, u32) {
    let decoder = png::Decoder::new(png_data);
    let reader = decoder.read_info().expect("decode");
    let info = reader.info();
    (info.width, info.height)
}

#[test]
fn test_health() {
    let (server, base) = start_server(Environment::Production);
    let resp = reqwest::blocking::get(format!("{}/api/health", base)).unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is healthy");
    server.stop();
}

#[test]
fn test_generate_default_size() {
    let (server, base) = start_server(Environment::Production);
    let client = reqwest::blocking::Client::new();
    let resp = client
        .post(format!("{}/api/canvas/generate", base))
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["content-type"], "image/png");
    let declared: usize = resp.headers()["content-length"].to_str().unwrap().parse().unwrap();
    let bytes = resp.bytes().unwrap();
    assert_eq!(declared, bytes.len());
    assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(decode(&bytes), (1200, 800));
    server.stop();
}

#[test]
fn test_generate_custom_size() {
    let (server, base) = start_server(Environment::Production);
    let client = reqwest::blocking::Client::new();
    let bytes = client
        .post(format!("{}/api/canvas/generate?width=300&height=150", base))
        .send()
        .unwrap()
        .bytes()
        .unwrap();
    assert_eq!(decode(&bytes), (300, 150));
    server.stop();
}

#[test]
fn test_invalid_dimensions() {
    let (server, base) = start_server(Environment::Production);
    let client = reqwest::blocking::Client::new();
    for (query, message) in [
        ("width=0", "Width must be a positive number"),
        ("width=-3", "Width must be a positive number"),
        ("height=abc", "Height must be a positive number"),
    ] {
        let resp = client
            .post(format!("{}/api/canvas/generate?{}", base, query))
            .send()
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400, "query {}", query);
        let body: serde_json::Value = resp.json().unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["message"], message);
        assert_eq!(body["error"]["statusCode"], 400);
        assert!(body["error"].get("stack").is_none());
    }
    server.stop();
}

#[test]
fn test_not_found_in_development() {
    let (server, base) = start_server(Environment::Development);
    let resp = reqwest::blocking::get(format!("{}/api/missing", base)).unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["error"]["message"], "Not Found - /api/missing");
    assert!(body["error"]["stack"].is_string());
    server.stop();
}

#[test]
fn test_concurrent_renders() {
    let (server, base) = start_server(Environment::Production);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let url = format!("{}/api/canvas/generate?width={}&height=64", base, 100 + i);
            std::thread::spawn(move || {
                let bytes = reqwest::blocking::Client::new()
                    .post(url)
                    .send()
                    .unwrap()
                    .bytes()
                    .unwrap();
                decode(&bytes)
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        assert_eq!(h.join().unwrap(), (100 + i as u32, 64));
    }
    server.stop();
}
