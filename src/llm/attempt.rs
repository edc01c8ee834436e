use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::llm::service::AttemptError;

/// Sends one request. Non-2xx responses become [`AttemptError::Service`]
/// carrying the body text; nothing is retried here.
pub(crate) async fn send_attempt(
    request: reqwest::RequestBuilder,
    timeout_secs: Option<u64>,
) -> Result<reqwest::Response, AttemptError> {
    let request = match timeout_secs {
        Some(secs) => request.timeout(Duration::from_secs(secs)),
        None => request,
    };

    let response = request.send().await.map_err(transport_error)?;
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(AttemptError::Service { status, body })
}

/// Reads the whole body and decodes it as `T`.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AttemptError> {
    let raw = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&raw).map_err(|err| AttemptError::Decode(err.to_string()))
}

fn transport_error(err: reqwest::Error) -> AttemptError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    // reqwest's message embeds the URL, which carries the API key.
    AttemptError::Transport(format!("{kind}: {}", redact_key(&err.without_url().to_string())))
}

/// Masks the value of a `key=` query parameter.
pub(crate) fn redact_key(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find("key=") {
        let (head, tail) = rest.split_at(idx + "key=".len());
        out.push_str(head);
        let end = tail
            .find(|c: char| c == '&' || c == ' ' || c == ')' || c == '"')
            .unwrap_or(tail.len());
        if end > 0 {
            out.push_str("***");
        }
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::redact_key;

    #[test]
    fn redact_key_masks_query_value() {
        assert_eq!(
            redact_key("https://host/v1/models?key=secret&pageSize=5"),
            "https://host/v1/models?key=***&pageSize=5"
        );
    }

    #[test]
    fn redact_key_leaves_text_without_key_untouched() {
        assert_eq!(redact_key("plain message"), "plain message");
        assert_eq!(redact_key("key="), "key=");
    }

    #[test]
    fn redact_key_handles_multiple_occurrences() {
        assert_eq!(redact_key("a?key=x b?key=y"), "a?key=*** b?key=***");
    }
}
