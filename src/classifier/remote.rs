use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{parse_star_label, SentimentClassifier};
use crate::error::CoreError;
use crate::label::SentimentLabel;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "nlptown/bert-base-multilingual-uncased-sentiment";

#[derive(Debug, Clone)]
pub struct RemoteClassifierConfig {
    pub endpoint: String,
    pub model: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for RemoteClassifierConfig {
    fn default() -> Self {
        RemoteClassifierConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Text-classification model served behind a hosted inference endpoint.
/// Inputs longer than the model's window are truncated server side.
pub struct RemoteClassifier {
    agent: ureq::Agent,
    url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    truncation: bool,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Failure { error: String },
}

impl RemoteClassifier {
    pub fn new(config: RemoteClassifierConfig) -> Self {
        // Error statuses still carry a JSON body worth reporting.
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .into();
        let url = format!(
            "{}/{}",
            config.endpoint.trim_end_matches('/'),
            config.model.trim_start_matches('/')
        );
        RemoteClassifier {
            agent,
            url,
            token: config.token,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SentimentClassifier for RemoteClassifier {
    fn classify(&self, text: &str) -> Result<SentimentLabel, CoreError> {
        debug!("[classifier] POST {} ({} chars)", self.url, text.chars().count());
        let body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters { truncation: true },
        };
        let mut request = self.agent.post(self.url.as_str());
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let response = request.send_json(&body).map_err(|err| {
            warn!("[classifier] request to {} failed: {err}", self.url);
            CoreError::unavailable(format!("request failed: {err}"))
        })?;
        let status = response.status();
        let payload = response
            .into_body()
            .read_to_string()
            .map_err(|err| CoreError::unavailable(format!("failed reading response body: {err}")))?;
        if !status.is_success() {
            warn!("[classifier] {} answered HTTP {}", self.url, status.as_u16());
            return Err(error_from_status(status.as_u16(), &payload));
        }
        label_from_response(&payload)
    }
}

/// Prefers the server's own `{"error": ..}` message over the bare status.
fn error_from_status(status: u16, payload: &str) -> CoreError {
    match serde_json::from_str::<InferenceResponse>(payload) {
        Ok(InferenceResponse::Failure { error }) => {
            CoreError::unavailable(format!("{error} (HTTP {status})"))
        }
        _ => CoreError::unavailable(format!("HTTP status {status}")),
    }
}

/// Picks the highest-scoring label out of an inference response body.
fn label_from_response(payload: &str) -> Result<SentimentLabel, CoreError> {
    let parsed: InferenceResponse = serde_json::from_str(payload)
        .map_err(|err| CoreError::unavailable(format!("unexpected response: {err}")))?;
    let scores = match parsed {
        InferenceResponse::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
        InferenceResponse::Flat(scores) => scores,
        InferenceResponse::Failure { error } => return Err(CoreError::unavailable(error)),
    };
    let best = scores
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| CoreError::unavailable("response carried no labels"))?;
    parse_star_label(&best.label)
        .ok_or_else(|| CoreError::unavailable(format!("unknown label '{}'", best.label)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    /// Serves exactly one response and hands back the raw request it received.
    fn spawn_one_shot_http(
        status_line: &'static str,
        payload: &'static str,
    ) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                payload.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            let _ = stream.flush();
            request
        });
        (format!("http://{addr}"), handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
            if head.contains("transfer-encoding: chunked") {
                if buf.ends_with(b"0\r\n\r\n") {
                    break;
                }
                continue;
            }
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + body_len {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn classifier_for(endpoint: String, token: Option<&str>) -> RemoteClassifier {
        RemoteClassifier::new(RemoteClassifierConfig {
            endpoint: format!("{endpoint}/models"),
            model: "org/model".to_string(),
            token: token.map(str::to_string),
            timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn classify_posts_truncating_request_with_bearer_token() {
        let (endpoint, server) = spawn_one_shot_http(
            "200 OK",
            r#"[[{"label":"5 stars","score":0.9},{"label":"1 star","score":0.1}]]"#,
        );
        let classifier = classifier_for(endpoint, Some("secret-token"));

        let label = classifier.classify("¡Me encanta!").unwrap();
        assert_eq!(label, SentimentLabel::VeryPositive);

        let request = server.join().unwrap();
        assert!(
            request.starts_with("POST /models/org/model HTTP/1.1\r\n"),
            "unexpected request line: {request}"
        );
        let lowered = request.to_lowercase();
        assert!(lowered.contains("authorization: bearer secret-token\r\n"));
        assert!(lowered.contains("content-type: application/json"));
        assert!(request.contains(r#"{"inputs":"¡Me encanta!","parameters":{"truncation":true}}"#));
    }

    #[test]
    fn classify_without_token_sends_no_authorization() {
        let (endpoint, server) =
            spawn_one_shot_http("200 OK", r#"[[{"label":"3 stars","score":0.7}]]"#);
        let classifier = classifier_for(endpoint, None);

        assert_eq!(classifier.classify("normal").unwrap(), SentimentLabel::Neutral);
        let request = server.join().unwrap().to_lowercase();
        assert!(!request.contains("authorization:"));
    }

    #[test]
    fn service_unavailable_reports_server_message() {
        let (endpoint, server) = spawn_one_shot_http(
            "503 Service Unavailable",
            r#"{"error":"Model nlptown is currently loading","estimated_time":20.0}"#,
        );
        let classifier = classifier_for(endpoint, None);

        match classifier.classify("hola") {
            Err(CoreError::ClassificationUnavailable { reason }) => {
                assert!(reason.contains("currently loading"), "reason: {reason}");
                assert!(reason.contains("503"), "reason: {reason}");
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn error_status_without_json_reports_status_code() {
        let (endpoint, server) = spawn_one_shot_http("502 Bad Gateway", "upstream down");
        let classifier = classifier_for(endpoint, None);

        match classifier.classify("hola") {
            Err(CoreError::ClassificationUnavailable { reason }) => {
                assert_eq!(reason, "HTTP status 502");
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn refused_connection_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let classifier = classifier_for(format!("http://{addr}"), None);

        match classifier.classify("hola") {
            Err(CoreError::ClassificationUnavailable { reason }) => {
                assert!(reason.starts_with("request failed"), "reason: {reason}");
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[test]
    fn picks_argmax_from_nested_response() {
        let body = r#"[[
            {"label": "1 star", "score": 0.05},
            {"label": "4 stars", "score": 0.61},
            {"label": "5 stars", "score": 0.30}
        ]]"#;
        assert_eq!(label_from_response(body).unwrap(), SentimentLabel::Positive);
    }

    #[test]
    fn accepts_flat_response() {
        let body = r#"[{"label": "2 stars", "score": 0.9}, {"label": "3 stars", "score": 0.1}]"#;
        assert_eq!(label_from_response(body).unwrap(), SentimentLabel::Negative);
    }

    #[test]
    fn error_payload_is_unavailable() {
        let body = r#"{"error": "Model is currently loading", "estimated_time": 20.0}"#;
        match label_from_response(body) {
            Err(CoreError::ClassificationUnavailable { reason }) => {
                assert!(reason.contains("loading"));
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[test]
    fn empty_or_unknown_labels_are_unavailable() {
        assert!(matches!(
            label_from_response("[[]]"),
            Err(CoreError::ClassificationUnavailable { .. })
        ));
        assert!(matches!(
            label_from_response(r#"[{"label": "POSITIVE", "score": 1.0}]"#),
            Err(CoreError::ClassificationUnavailable { .. })
        ));
        assert!(matches!(
            label_from_response("not json"),
            Err(CoreError::ClassificationUnavailable { .. })
        ));
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let classifier = RemoteClassifier::new(RemoteClassifierConfig {
            endpoint: "http://localhost:8080/models/".to_string(),
            model: "org/model".to_string(),
            ..Default::default()
        });
        assert_eq!(classifier.url(), "http://localhost:8080/models/org/model");
    }
}
