use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use egobot_contracts::results::{ModelResponse, TokenUsage};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{EgobotError, Result};
use crate::media::data_uri_for_path;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful robot reasoning assistant.";
pub const REASONING_OPEN: &str = "<think>";
pub const REASONING_CLOSE: &str = "</think>";

const REASONING_INSTRUCTION: &str = "Answer the question using the following format:\n\
<think>\nYour reasoning.\n</think>\n\n\
Write your final answer immediately after the </think> tag.";

pub trait ChatTransport: Send + Sync {
    fn complete(&self, payload: &Value) -> anyhow::Result<Value>;
}

pub struct HttpTransport {
    endpoint: String,
    api_key: String,
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| EgobotError::config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url),
            api_key: config.api_key.clone(),
            http,
        })
    }
}

impl ChatTransport for HttpTransport {
    fn complete(&self, payload: &Value) -> anyhow::Result<Value> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .with_context(|| format!("POST {} failed", self.endpoint))?;
        response_json_or_error(response)
    }
}

#[derive(Clone)]
pub struct ReasoningClient {
    config: Config,
    transport: Arc<dyn ChatTransport>,
}

impl ReasoningClient {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
        })
    }

    pub fn with_transport(config: Config, transport: Arc<dyn ChatTransport>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn reason_about_image(
        &self,
        image_path: &Path,
        prompt: &str,
        system_prompt: &str,
        enable_reasoning: bool,
    ) -> Result<ModelResponse> {
        let data_uri = data_uri_for_path(image_path)?;
        self.call(system_prompt, vec![data_uri], prompt, enable_reasoning)
    }

    pub fn reason_about_image_url(
        &self,
        image_url: &str,
        prompt: &str,
        system_prompt: &str,
        enable_reasoning: bool,
    ) -> Result<ModelResponse> {
        self.call(
            system_prompt,
            vec![image_url.to_string()],
            prompt,
            enable_reasoning,
        )
    }

    pub fn reason_about_frames<P: AsRef<Path>>(
        &self,
        frame_paths: &[P],
        prompt: &str,
        system_prompt: &str,
        enable_reasoning: bool,
    ) -> Result<ModelResponse> {
        let images = frame_paths
            .iter()
            .map(|path| data_uri_for_path(path.as_ref()))
            .collect::<Result<Vec<String>>>()?;
        self.call(system_prompt, images, prompt, enable_reasoning)
    }

    fn call(
        &self,
        system_prompt: &str,
        image_urls: Vec<String>,
        prompt: &str,
        enable_reasoning: bool,
    ) -> Result<ModelResponse> {
        let image_count = image_urls.len();
        let full_prompt = with_reasoning_instruction(prompt, enable_reasoning);
        let payload = self.build_payload(system_prompt, image_urls, &full_prompt);

        debug!(model = %self.config.model, images = image_count, "sending reasoning request");
        let started = Instant::now();
        let response = self
            .transport
            .complete(&payload)
            .map_err(EgobotError::RemoteCall)?;
        let (raw, usage) = parse_completion(&response);
        info!(
            model = %self.config.model,
            latency_ms = started.elapsed().as_millis() as u64,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "reasoning request completed"
        );

        let (reasoning, answer) = if enable_reasoning {
            split_reasoning(&raw)
        } else {
            (String::new(), raw.trim().to_string())
        };
        Ok(ModelResponse {
            reasoning,
            answer,
            raw,
            usage,
        })
    }

    fn build_payload(&self, system_prompt: &str, image_urls: Vec<String>, prompt: &str) -> Value {
        let mut content: Vec<Value> = image_urls
            .into_iter()
            .map(|url| json!({"type": "image_url", "image_url": {"url": url}}))
            .collect();
        content.push(json!({"type": "text", "text": prompt}));
        json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": content},
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "top_p": self.config.top_p,
            "stream": false,
        })
    }
}

pub fn with_reasoning_instruction(prompt: &str, enable: bool) -> String {
    if !enable {
        return prompt.to_string();
    }
    format!("{prompt}\n\n{REASONING_INSTRUCTION}")
}

/// Splits a reply into `(reasoning, answer)` at the first delimiter pair.
///
/// Without both markers, in order, the whole trimmed text is the answer.
/// Repeated or nested markers are not treated specially.
pub fn split_reasoning(text: &str) -> (String, String) {
    if let (Some(open), Some(close)) = (text.find(REASONING_OPEN), text.find(REASONING_CLOSE)) {
        let start = open + REASONING_OPEN.len();
        if close >= start {
            let reasoning = text[start..close].trim().to_string();
            let answer = text[close + REASONING_CLOSE.len()..].trim().to_string();
            return (reasoning, answer);
        }
    }
    (String::new(), text.trim().to_string())
}

fn parse_completion(response: &Value) -> (String, TokenUsage) {
    let text = response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let count = |key: &str| {
        response
            .get("usage")
            .and_then(|usage| usage.get(key))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    };
    let usage = TokenUsage {
        prompt_tokens: count("prompt_tokens"),
        completion_tokens: count("completion_tokens"),
        total_tokens: count("total_tokens"),
    };
    (text, usage)
}

fn response_json_or_error(response: HttpResponse) -> anyhow::Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .context("model endpoint response body read failed")?;
    if !status.is_success() {
        bail!(
            "model endpoint request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    let parsed: Value =
        serde_json::from_str(&body).context("model endpoint returned invalid JSON payload")?;
    Ok(parsed)
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};

    use serde_json::json;

    use super::{
        split_reasoning, with_reasoning_instruction, ChatTransport, HttpTransport,
        ReasoningClient, DEFAULT_SYSTEM_PROMPT,
    };
    use crate::config::Config;
    use crate::error::EgobotError;
    use crate::testing::{completion, test_config, ScriptedTransport};

    #[test]
    fn split_with_markers() {
        let (reasoning, answer) = split_reasoning("<think>\nthought\n</think>\nanswer");
        assert_eq!(reasoning, "thought");
        assert_eq!(answer, "answer");
    }

    #[test]
    fn split_without_markers() {
        assert_eq!(
            split_reasoning("  plain text \n"),
            (String::new(), "plain text".to_string())
        );
        assert_eq!(
            split_reasoning("<think> never closed"),
            (String::new(), "<think> never closed".to_string())
        );
    }

    #[test]
    fn split_requires_markers_in_order() {
        let text = "</think> early close <think> late open";
        assert_eq!(split_reasoning(text), (String::new(), text.to_string()));
    }

    #[test]
    fn split_uses_first_occurrences_only() {
        let (reasoning, answer) =
            split_reasoning("<think>a</think> first <think>b</think> second");
        assert_eq!(reasoning, "a");
        assert_eq!(answer, "first <think>b</think> second");
    }

    #[test]
    fn reasoning_instruction_is_appended_only_when_enabled() {
        assert_eq!(with_reasoning_instruction("describe", false), "describe");
        let augmented = with_reasoning_instruction("describe", true);
        assert!(augmented.starts_with("describe\n\nAnswer the question"));
        assert!(augmented.contains("<think>\nYour reasoning.\n</think>"));
        assert!(augmented.ends_with("immediately after the </think> tag."));
    }

    #[test]
    fn missing_credential_fails_at_construction() {
        let transport = Arc::new(ScriptedTransport::replying("unused"));
        let err = ReasoningClient::with_transport(Config::default(), transport.clone())
            .err()
            .expect("construction should fail");
        assert!(matches!(err, EgobotError::Configuration(_)));
        assert!(transport.payloads().is_empty());
    }

    #[test]
    fn image_request_carries_system_image_and_prompt() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let image = temp.path().join("scene.jpg");
        std::fs::write(&image, b"jpg")?;
        let transport = Arc::new(ScriptedTransport::replying(
            "<think>two people</think>{\"people_count\": 2}",
        ));
        let client = ReasoningClient::with_transport(test_config(), transport.clone())?;

        let response = client.reason_about_image(&image, "count people", DEFAULT_SYSTEM_PROMPT, true)?;
        assert_eq!(response.reasoning, "two people");
        assert_eq!(response.answer, "{\"people_count\": 2}");
        assert_eq!(response.usage.total_tokens, 30);

        let payloads = transport.payloads();
        assert_eq!(payloads.len(), 1);
        let payload = &payloads[0];
        assert_eq!(payload["model"], json!("nvidia/cosmos-reason2-8b"));
        assert_eq!(payload["max_tokens"], json!(4096));
        assert_eq!(payload["stream"], json!(false));
        assert_eq!(payload["messages"][0]["role"], json!("system"));
        assert_eq!(payload["messages"][0]["content"], json!(DEFAULT_SYSTEM_PROMPT));
        let content = payload["messages"][1]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], json!("image_url"));
        assert_eq!(
            content[0]["image_url"]["url"],
            json!("data:image/jpeg;base64,anBn")
        );
        assert_eq!(content[1]["type"], json!("text"));
        assert!(content[1]["text"]
            .as_str()
            .unwrap()
            .starts_with("count people\n\nAnswer the question"));
        Ok(())
    }

    #[test]
    fn url_request_without_reasoning_keeps_prompt_and_answer_verbatim() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::replying(
            "<think>kept</think> answer",
        ));
        let client = ReasoningClient::with_transport(test_config(), transport.clone())?;
        let response = client.reason_about_image_url(
            "https://example.com/scene.png",
            "describe",
            "sys",
            false,
        )?;
        assert_eq!(response.reasoning, "");
        assert_eq!(response.answer, "<think>kept</think> answer");

        let payload = &transport.payloads()[0];
        let content = &payload["messages"][1]["content"];
        assert_eq!(
            content[0]["image_url"]["url"],
            json!("https://example.com/scene.png")
        );
        assert_eq!(content[1]["text"], json!("describe"));
        Ok(())
    }

    #[test]
    fn frames_are_attached_in_order_before_text() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut frames = Vec::new();
        for (idx, body) in [b"aa", b"bb", b"cc"].iter().enumerate() {
            let path = temp.path().join(format!("frame_{idx:06}.jpg"));
            std::fs::write(&path, body)?;
            frames.push(path);
        }
        let transport = Arc::new(ScriptedTransport::replying("answer"));
        let client = ReasoningClient::with_transport(test_config(), transport.clone())?;
        client.reason_about_frames(&frames, "what happens", "sys", true)?;

        let payload = &transport.payloads()[0];
        let content = payload["messages"][1]["content"].as_array().unwrap();
        let urls: Vec<&str> = content
            .iter()
            .filter_map(|part| part["image_url"]["url"].as_str())
            .collect();
        assert_eq!(
            urls,
            vec![
                "data:image/jpeg;base64,YWE=",
                "data:image/jpeg;base64,YmI=",
                "data:image/jpeg;base64,Y2M=",
            ]
        );
        assert_eq!(content.last().unwrap()["type"], json!("text"));
        Ok(())
    }

    #[test]
    fn transport_failure_is_remote_call_error() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::failing("quota exceeded"));
        let client = ReasoningClient::with_transport(test_config(), transport)?;
        let err = client
            .reason_about_image_url("https://example.com/a.png", "p", "s", true)
            .unwrap_err();
        assert!(matches!(err, EgobotError::RemoteCall(_)));
        assert!(err.to_string().contains("quota exceeded"));
        Ok(())
    }

    fn serve_once(status: &str, body: String) -> anyhow::Result<(String, JoinHandle<String>)> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let base_url = format!("http://{}/v1", listener.local_addr()?);
        let status = status.to_string();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept request");
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            request
        });
        Ok((base_url, handle))
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = stream.read(&mut chunk).expect("read request");
            if read == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..read]);
            let Some(head_end) = buf.windows(4).position(|window| window == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
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

    #[test]
    fn http_transport_posts_with_bearer_and_reports_status() -> anyhow::Result<()> {
        let body = format!("{{\"error\": \"rate limited {}\"}}", "x".repeat(600));
        let (base_url, server) = serve_once("429 Too Many Requests", body)?;
        let client = ReasoningClient::new(test_config().with_base_url(&base_url))?;

        let err = client
            .reason_about_image_url("https://example.com/a.png", "describe", "sys", true)
            .unwrap_err();
        assert!(matches!(err, EgobotError::RemoteCall(_)));
        let text = err.to_string();
        assert!(text.contains("(429)"), "unexpected error: {text}");
        assert!(text.contains("rate limited"));
        assert!(text.contains('…'));
        assert!(!text.contains(&"x".repeat(600)));

        let request = server.join().expect("server thread");
        assert!(request.starts_with("POST /v1/chat/completions HTTP/1.1\r\n"));
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer test-key"));
        assert!(request.contains("\"model\":\"nvidia/cosmos-reason2-8b\""));
        Ok(())
    }

    #[test]
    fn http_transport_rejects_non_json_success_body() -> anyhow::Result<()> {
        let (base_url, server) = serve_once("200 OK", "<html>gateway</html>".to_string())?;
        let transport = HttpTransport::new(&test_config().with_base_url(&base_url))?;

        let err = transport.complete(&json!({"model": "m"})).unwrap_err();
        assert!(format!("{err:#}").contains("invalid JSON"));
        server.join().expect("server thread");
        Ok(())
    }

    #[test]
    fn http_transport_returns_completion_body() -> anyhow::Result<()> {
        let reply = serde_json::to_string(&completion("<think>t</think>done"))?;
        let (base_url, server) = serve_once("200 OK", reply)?;
        let client = ReasoningClient::new(test_config().with_base_url(&base_url))?;

        let response =
            client.reason_about_image_url("https://example.com/a.png", "describe", "sys", true)?;
        assert_eq!(response.reasoning, "t");
        assert_eq!(response.answer, "done");
        assert_eq!(response.usage.total_tokens, 30);
        server.join().expect("server thread");
        Ok(())
    }

    #[test]
    fn missing_content_and_usage_default_to_empty() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::with_responses(vec![Ok(json!({
            "choices": [{"message": {"content": null}}]
        }))]));
        let client = ReasoningClient::with_transport(test_config(), transport)?;
        let response = client.reason_about_image_url("https://example.com/a.png", "p", "s", true)?;
        assert_eq!(response.answer, "");
        assert_eq!(response.raw, "");
        assert_eq!(response.usage.total_tokens, 0);
        Ok(())
    }
}
