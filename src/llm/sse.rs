// Server-sent-event framing shared by the streaming adapters.

use futures::stream::{self, BoxStream, StreamExt};

use crate::types::{AppError, AppResult};

/// Turn a streaming HTTP response into the payloads of its `data:` lines.
///
/// Lines are split on raw bytes so multi-byte characters that straddle
/// network chunks are decoded intact.
pub fn data_payloads(response: reqwest::Response) -> BoxStream<'static, AppResult<String>> {
    let bytes = response.bytes_stream().boxed();

    stream::unfold(
        (bytes, Vec::<u8>::new(), false),
        |(mut bytes, mut buffer, finished)| async move {
            loop {
                if let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    if let Some(payload) = data_of(&line) {
                        return Some((Ok(payload), (bytes, buffer, finished)));
                    }
                    continue;
                }

                if finished {
                    if buffer.is_empty() {
                        return None;
                    }
                    let line = std::mem::take(&mut buffer);
                    if let Some(payload) = data_of(&line) {
                        return Some((Ok(payload), (bytes, buffer, true)));
                    }
                    return None;
                }

                match bytes.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => {
                        let err = AppError::LLMApi(format!("Stream read failed: {}", e));
                        return Some((Err(err), (bytes, Vec::new(), true)));
                    }
                    None => {
                        // Flush a trailing line without a newline, then stop.
                        return match data_of(&std::mem::take(&mut buffer)) {
                            Some(payload) => Some((Ok(payload), (bytes, Vec::new(), true))),
                            None => None,
                        };
                    }
                }
            }
        },
    )
    .boxed()
}

fn data_of(line: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim_end_matches(['\r', '\n']);
    text.strip_prefix("data:").map(|p| p.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_of() {
        assert_eq!(data_of(b"data: {\"a\":1}\r\n").as_deref(), Some("{\"a\":1}"));
        assert_eq!(data_of(b"data:[DONE]").as_deref(), Some("[DONE]"));
        assert_eq!(data_of(b": keep-alive\n"), None);
        assert_eq!(data_of(b"event: message\n"), None);
    }
}
