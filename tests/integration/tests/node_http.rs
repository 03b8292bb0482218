//! Integration test: a real node on a loopback port, driven over HTTP.

use serde_json::{json, Value};

use credentia_integration_tests::SCENARIO_DIGEST;
use credentia_node::{CredentiaConfig, CredentiaNode};

struct TestNode {
    node: CredentiaNode,
    base: String,
    http: reqwest::Client,
}

impl TestNode {
    async fn start(data_dir: &std::path::Path) -> Self {
        let mut config = CredentiaConfig::default();
        config.storage.data_dir = data_dir.to_path_buf();
        config.api.port = 0;

        let mut node = CredentiaNode::new(config).unwrap();
        node.start().await.unwrap();
        let base = format!("http://{}", node.api_addr().unwrap());
        Self {
            node,
            base,
            http: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str, org: &str) -> (u16, Value) {
        let resp = self
            .http
            .get(format!("{}{}", self.base, path))
            .header("x-msp-id", org)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, org: &str, body: Value) -> (u16, Value) {
        let resp = self
            .http
            .post(format!("{}{}", self.base, path))
            .header("x-msp-id", org)
            .json(&body)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn stop(mut self) {
        self.node.shutdown().await.unwrap();
    }
}

fn credential() -> Value {
    json!({
        "credID": "CRED3001",
        "studentID": "S-301",
        "studentName": "Asha Patel",
        "university": "UniA",
        "degree": "B.Tech",
        "gpa": "8.8",
        "issueDate": "2025-10-01"
    })
}

#[tokio::test]
async fn test_scenario_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let node = TestNode::start(dir.path()).await;

    let (status, issued) = node.post("/issue", "Org1MSP", credential()).await;
    assert_eq!(status, 201);
    assert_eq!(issued["storedHash"], SCENARIO_DIGEST);

    let (status, _) = node
        .post(
            "/share",
            "Org1MSP",
            json!({"credID": "CRED3001", "targetMSP": "Org2MSP"}),
        )
        .await;
    assert_eq!(status, 200);

    let (status, report) = node.get("/verify-hash/CRED3001", "Org2MSP").await;
    assert_eq!(status, 200);
    assert_eq!(report["isHashValid"], true);
    assert_eq!(report["storedHash"], SCENARIO_DIGEST);
    assert_eq!(report["computedHash"], SCENARIO_DIGEST);

    let (status, _) = node.get("/verify/CRED3001", "Org3MSP").await;
    assert_eq!(status, 404);

    let (status, _) = node
        .post("/revoke", "Org1MSP", json!({"credID": "CRED3001"}))
        .await;
    assert_eq!(status, 200);

    let (status, history) = node.get("/history/CRED3001", "Org2MSP").await;
    assert_eq!(status, 200);
    let actions: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["ISSUE", "SHARE", "REVOKE"]);

    node.stop().await;
}

#[tokio::test]
async fn test_state_persists_across_restart() {
    let dir = tempfile::tempdir().unwrap();

    let node = TestNode::start(dir.path()).await;
    node.post("/issue", "Org1MSP", credential()).await;
    node.post(
        "/share",
        "Org1MSP",
        json!({"credID": "CRED3001", "targetMSP": "Org2MSP"}),
    )
    .await;
    node.stop().await;

    let node = TestNode::start(dir.path()).await;
    let (status, view) = node.get("/verify/CRED3001", "Org2MSP").await;
    assert_eq!(status, 200);
    assert_eq!(view["state"], "Shared");
    assert_eq!(view["storedHash"], SCENARIO_DIGEST);

    let (status, body) = node.post("/issue", "Org1MSP", credential()).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["kind"], "Conflict");

    let (_, history) = node.get("/history/CRED3001", "Org1MSP").await;
    assert_eq!(history.as_array().unwrap().len(), 2);

    node.stop().await;
}
