//! # Integration Tests
//!
//! End-to-end tests against loopback HTTP servers.
//!
//! Covers:
//! - Config file to delivered bulk payload
//! - Size, timer and shutdown hand-offs
//! - Endpoint spreading and failed deliveries

#[cfg(test)]
mod contract_tests {
    use contracts::{Batch, EncodedEntry, Record};
    use serde_json::json;

    #[test]
    fn test_encoded_batch_decodes_back() {
        let records: Vec<Record> = vec![
            json!({ "service": "api", "n": 1 }).as_object().cloned().unwrap(),
            json!({ "service": "db", "msg": "line\nbreak" }).as_object().cloned().unwrap(),
        ];
        let entries: Vec<EncodedEntry> = records
            .iter()
            .map(|r| ingestion::wire::encode_entry("logs", r).unwrap())
            .collect();
        let batch = Batch::from_entries(entries).unwrap();

        let decoded = ingestion::wire::decode_payload(&batch.to_bulk_payload()).unwrap();
        assert_eq!(decoded.len(), 2);
        for ((index, body), record) in decoded.iter().zip(&records) {
            assert_eq!(index, "logs");
            assert_eq!(body.as_object(), Some(record));
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use batch_engine::BulkOutput;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{OutputConfig, Record};
    use serde_json::{json, Value};

    /// Bodies received by one loopback endpoint
    #[derive(Clone, Default)]
    struct Endpoint {
        bodies: Arc<Mutex<Vec<String>>>,
    }

    impl Endpoint {
        fn documents(&self) -> Vec<Vec<(String, Value)>> {
            self.bodies
                .lock()
                .unwrap()
                .iter()
                .map(|body| ingestion::wire::decode_payload(body.as_bytes()).unwrap())
                .collect()
        }

        fn calls(&self) -> usize {
            self.bodies.lock().unwrap().len()
        }
    }

    async fn bulk_handler(State(endpoint): State<Endpoint>, body: String) -> StatusCode {
        endpoint.bodies.lock().unwrap().push(body);
        StatusCode::OK
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        format!("http://{addr}")
    }

    async fn spawn_endpoint() -> (String, Endpoint) {
        let endpoint = Endpoint::default();
        let router = Router::new()
            .route("/api/_bulk", post(bulk_handler))
            .with_state(endpoint.clone());
        (serve(router).await, endpoint)
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn config(addresses: Vec<String>, batch_size: usize, concurrency: usize) -> OutputConfig {
        let mut config = OutputConfig::new(addresses, "admin", "pw", "logs-%{service}");
        config.batch_size = batch_size;
        config.concurrency = concurrency;
        config
    }

    /// batch_size 2, records A B C: {A,B} on size, {C} on shutdown
    #[tokio::test]
    async fn test_e2e_size_hand_off_and_shutdown_flush() {
        let (address, endpoint) = spawn_endpoint().await;
        let toml = format!(
            r#"
addresses = ["{address}"]
username = "admin"
password = "pw"
index = "logs-%{{service}}"
batch_size = 2
concurrency = 1
batch_flush_interval = 3600
"#
        );
        let config = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let output = BulkOutput::connect(config).unwrap();

        for name in ["A", "B", "C"] {
            output
                .emit(&record(json!({ "service": "api", "name": name })))
                .await;
        }
        let report = output.shutdown().await.unwrap();
        assert_eq!(report.workers_joined, 1);

        let calls = endpoint.documents();
        assert_eq!(calls.len(), 2);
        let names: Vec<Vec<&str>> = calls
            .iter()
            .map(|docs| docs.iter().map(|(_, b)| b["name"].as_str().unwrap()).collect())
            .collect();
        assert_eq!(names, vec![vec!["A", "B"], vec!["C"]]);
        assert!(calls.iter().flatten().all(|(index, _)| index == "logs-api"));

        let stats = output.stats().await;
        assert_eq!(stats.emitted, 3);
        assert_eq!(stats.pool.batches_delivered, 2);
        assert_eq!(stats.pool.entries_delivered, 3);
        assert_eq!(stats.pool.live_workers, 0);
    }

    /// Fewer records than batch_size: nothing is sent until the timer fires
    #[tokio::test]
    async fn test_e2e_timer_flush() {
        let (address, endpoint) = spawn_endpoint().await;
        let output = BulkOutput::builder(config(vec![address], 100, 2))
            .flush_interval(Duration::from_millis(200))
            .start()
            .unwrap();

        for n in 0..3 {
            output.emit(&record(json!({ "service": "web", "n": n }))).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(endpoint.calls(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let calls = endpoint.documents();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 3);

        output.shutdown().await;
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn test_e2e_spreads_batches_across_endpoints() {
        let (first, first_endpoint) = spawn_endpoint().await;
        let (second, second_endpoint) = spawn_endpoint().await;
        let output = BulkOutput::connect(config(vec![first, second], 1, 4)).unwrap();

        for n in 0..40 {
            output.emit(&record(json!({ "service": "api", "n": n }))).await;
        }
        output.shutdown().await;

        let (a, b) = (first_endpoint.calls(), second_endpoint.calls());
        assert_eq!(a + b, 40);
        assert!(a > 0 && b > 0, "first={a} second={b}");
    }

    #[tokio::test]
    async fn test_e2e_failed_batches_are_dropped() {
        let router = Router::new().route(
            "/api/_bulk",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let address = serve(router).await;
        let output = BulkOutput::connect(config(vec![address], 1, 2)).unwrap();

        output.emit(&record(json!({ "service": "api" }))).await;
        output.emit(&record(json!({ "service": "api" }))).await;
        let report = output.shutdown().await.unwrap();

        let stats = output.stats().await;
        assert_eq!(stats.pool.batches_failed, 2);
        assert_eq!(stats.pool.batches_delivered, 0);
        assert_eq!(report.workers_panicked, 0);
        assert_eq!(stats.pool.live_workers, 0);
    }

    #[tokio::test]
    async fn test_e2e_unencodable_record_skipped() {
        let (address, endpoint) = spawn_endpoint().await;
        let output = BulkOutput::connect(config(vec![address], 10, 1)).unwrap();

        output.emit(&record(json!({ "other": 1 }))).await;
        output.emit(&record(json!({ "service": "api" }))).await;
        output.shutdown().await;

        let calls = endpoint.documents();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        assert_eq!(output.stats().await.encode_failed, 1);
    }

    #[tokio::test]
    async fn test_zero_endpoints_fails_construction() {
        let result = BulkOutput::connect(config(Vec::new(), 10, 1));
        assert!(result.is_err());
    }
}
