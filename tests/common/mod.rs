//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kramlink::models::Config;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Route table of a stub catalog: request key -> JSON body.
///
/// Plain requests are keyed by path; V7 search requests by `search:<q>`.
#[derive(Default, Clone)]
pub struct Routes(HashMap<String, Value>);

impl Routes {
    pub fn get(mut self, path: &str, body: Value) -> Self {
        self.0.insert(path.to_string(), body);
        self
    }

    pub fn search(self, pid: &str, model: &str, title: &str) -> Self {
        let key = format!("search:pid:\"{pid}\"");
        let body = json!({"response": {"numFound": 1, "docs": [
            {"pid": pid, "model": model, "title.search": title}
        ]}});
        self.get(&key, body)
    }
}

/// Running stub catalog.
pub struct StubCatalog {
    pub base_url: String,
    pub hits: Arc<AtomicUsize>,
}

impl StubCatalog {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn route_key(target: &str) -> String {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if path.ends_with("/search") {
        let q = url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        format!("search:{q}")
    } else {
        path.to_string()
    }
}

/// Serve `routes` until the test ends; unknown routes answer 404.
pub async fn serve(routes: Routes) -> StubCatalog {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let routes = Arc::clone(&routes);
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]);
                let target = head.split_whitespace().nth(1).unwrap_or("/");
                counter.fetch_add(1, Ordering::SeqCst);

                let (status, body) = match routes.0.get(&route_key(target)) {
                    Some(body) => (200, body.to_string()),
                    None => (404, "{}".to_string()),
                };
                let reply = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    StubCatalog {
        base_url: format!("http://{addr}"),
        hits,
    }
}

/// Configuration with fast retries.
pub fn config() -> Config {
    let mut config = Config::default();
    config.http.backoff_base_ms = 1;
    config.http.max_retries = 1;
    config.http.timeout_secs = 5;
    config
}

/// Write a periodical file without a tree.
pub fn write_periodical(dir: &Path, key: &str, version: &str, api_url: &str) {
    let file = json!({
        "name": "Frenštátské noviny",
        "uuid": "uuid:per",
        "library": "test",
        "kramerius_ver": version,
        "url": "https://kramerius.example.cz/view/",
        "api_url": api_url,
    });
    std::fs::write(dir.join(key), serde_json::to_vec_pretty(&file).unwrap()).unwrap();
}

/// V7 catalog: volume 12 with a single issue, volume 13 with two.
pub fn v7_routes() -> Routes {
    const P: &str = "/search/api/client/v7.0";
    let structure = |pids: &[&str]| {
        let own: Vec<Value> = pids
            .iter()
            .map(|pid| json!({"pid": pid, "relation": "hasPart"}))
            .collect();
        json!({"parents": {}, "children": {"own": own, "foster": []}})
    };

    Routes::default()
        .get(&format!("{P}/info"), json!({"version": "7.0.32"}))
        .get(&format!("{P}/items/uuid:per/info/structure"), structure(&["uuid:v12", "uuid:v13"]))
        .get(&format!("{P}/items/uuid:v12/info/structure"), structure(&["uuid:v12-i2"]))
        .get(&format!("{P}/items/uuid:v12-i2/info/structure"), structure(&["uuid:p5", "uuid:p6"]))
        .get(&format!("{P}/items/uuid:v13/info/structure"), structure(&["uuid:v13-i1", "uuid:v13-i2"]))
        .get(&format!("{P}/items/uuid:v13-i1/info/structure"), structure(&["uuid:p4"]))
        .get(&format!("{P}/items/uuid:v13-i2/info/structure"), structure(&[]))
        .search("uuid:v12", "periodicalvolume", "12")
        .search("uuid:v13", "periodicalvolume", "13")
        .search("uuid:v12-i2", "periodicalitem", "2")
        .search("uuid:v13-i1", "periodicalitem", "1")
        .search("uuid:v13-i2", "periodicalitem", "2")
        .search("uuid:p5", "page", "5")
        .search("uuid:p6", "page", "6")
        .search("uuid:p4", "page", "4")
}

/// V5 catalog with the same shape as [`v7_routes`].
pub fn v5_routes() -> Routes {
    const P: &str = "/search/api/v5.0";
    Routes::default()
        .get(&format!("{P}/info"), json!({"version": "5.3.7"}))
        .get(
            &format!("{P}/item/uuid:per/children"),
            json!([
                {"pid": "uuid:v12", "model": "periodicalvolume", "details": {"volumeNumber": "12", "year": "1935"}},
                {"pid": "uuid:v13", "model": "periodicalvolume", "details": {"volumeNumber": "13", "year": "1936"}},
                {"pid": "uuid:sup", "model": "supplement", "details": {}}
            ]),
        )
        .get(
            &format!("{P}/item/uuid:v12/children"),
            json!([{"pid": "uuid:v12-i2", "model": "periodicalitem", "details": {"partNumber": "2"}}]),
        )
        .get(
            &format!("{P}/item/uuid:v12-i2/children"),
            json!([
                {"pid": "uuid:p5", "model": "page", "details": {"pagenumber": "5 ", "type": "normalPage"}},
                {"pid": "uuid:p6", "model": "page", "details": {"pagenumber": "6", "type": "normalPage"}}
            ]),
        )
        .get(
            &format!("{P}/item/uuid:v13/children"),
            json!([
                {"pid": "uuid:v13-i1", "model": "periodicalitem", "details": {"partNumber": "1"}},
                {"pid": "uuid:v13-i2", "model": "periodicalitem", "details": {"partNumber": "2"}}
            ]),
        )
        .get(
            &format!("{P}/item/uuid:v13-i1/children"),
            json!([{"pid": "uuid:p4", "model": "page", "details": {"pagenumber": "4"}}]),
        )
        .get(&format!("{P}/item/uuid:v13-i2/children"), json!([]))
}
