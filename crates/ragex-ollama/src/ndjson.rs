//! Decoding of Ollama's newline-delimited JSON chat stream

use futures::stream::{self, Stream, StreamExt};
use ragex_core::{Error, Result};
use serde::Deserialize;
use std::fmt::Display;

#[derive(Debug, Deserialize)]
pub(crate) struct ChunkMessage {
    #[serde(default)]
    pub content: String,
}

/// One line of a `/api/chat` response
#[derive(Debug, Deserialize)]
pub(crate) struct ChatChunk {
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
    pub error: Option<String>,
}

impl ChatChunk {
    pub fn parse(line: &[u8]) -> Result<Self> {
        let chunk: ChatChunk = serde_json::from_slice(line).map_err(|e| {
            Error::GenerationUnavailable(format!(
                "malformed chat chunk '{}': {}",
                String::from_utf8_lossy(line),
                e
            ))
        })?;
        if let Some(error) = chunk.error {
            return Err(Error::GenerationUnavailable(error));
        }
        Ok(chunk)
    }

    pub fn into_text(self) -> String {
        self.message.map(|m| m.content).unwrap_or_default()
    }
}

struct LineReader<S> {
    inner: S,
    buffer: Vec<u8>,
    exhausted: bool,
}

/// Split a byte stream into JSON lines and decode each one.
///
/// Lines may straddle chunk boundaries. A transport error ends the stream
/// after being reported once.
pub(crate) fn decode_chunks<S, B, E>(inner: S) -> impl Stream<Item = Result<ChatChunk>> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    let reader = LineReader {
        inner,
        buffer: Vec::new(),
        exhausted: false,
    };

    stream::unfold(reader, |mut reader| async move {
        loop {
            if let Some(pos) = reader.buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = reader.buffer.drain(..=pos).collect();
                let line = line.trim_ascii();
                if line.is_empty() {
                    continue;
                }
                return Some((ChatChunk::parse(line), reader));
            }

            if reader.exhausted {
                if reader.buffer.trim_ascii().is_empty() {
                    return None;
                }
                let rest = std::mem::take(&mut reader.buffer);
                return Some((ChatChunk::parse(rest.trim_ascii()), reader));
            }

            match reader.inner.next().await {
                Some(Ok(bytes)) => reader.buffer.extend_from_slice(bytes.as_ref()),
                Some(Err(e)) => {
                    reader.exhausted = true;
                    reader.buffer.clear();
                    return Some((
                        Err(Error::GenerationUnavailable(format!("stream interrupted: {}", e))),
                        reader,
                    ));
                }
                None => reader.exhausted = true,
            }
        }
    })
}

/// Text fragments of a chat stream, stopping at the `done` chunk or the first error
pub(crate) fn decode_text<S, B, E>(inner: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    decode_chunks(inner)
        .scan(false, |finished, chunk| {
            if *finished {
                return futures::future::ready(None);
            }
            let item = match chunk {
                Ok(chunk) => {
                    *finished = chunk.done;
                    Ok(chunk.into_text())
                }
                Err(e) => {
                    *finished = true;
                    Err(e)
                }
            };
            futures::future::ready(Some(item))
        })
        .filter(|item| futures::future::ready(!matches!(item, Ok(text) if text.is_empty())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    type Parts = stream::Iter<std::vec::IntoIter<std::result::Result<Vec<u8>, String>>>;

    fn chunks(parts: &[&str]) -> Parts {
        let owned: Vec<std::result::Result<Vec<u8>, String>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        stream::iter(owned)
    }

    #[tokio::test]
    async fn test_lines_split_across_chunks() {
        let body = chunks(&[
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Hel\"},\"done\":false}\n{\"mess",
            "age\":{\"role\":\"assistant\",\"content\":\"lo\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}",
        ]);

        let fragments: Vec<String> = decode_text(body).try_collect().await.unwrap();
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let body = chunks(&["\n\n{\"message\":{\"content\":\"a\"},\"done\":true}\n\n"]);
        let fragments: Vec<String> = decode_text(body).try_collect().await.unwrap();
        assert_eq!(fragments, vec!["a"]);
    }

    #[tokio::test]
    async fn test_nothing_after_done() {
        let body = chunks(&[
            "{\"message\":{\"content\":\"a\"},\"done\":true}\n",
            "{\"message\":{\"content\":\"late\"},\"done\":false}\n",
        ]);
        let fragments: Vec<String> = decode_text(body).try_collect().await.unwrap();
        assert_eq!(fragments, vec!["a"]);
    }

    #[tokio::test]
    async fn test_error_line() {
        let body = chunks(&["{\"error\":\"model 'nope' not found\"}\n"]);
        let err = decode_text(body).try_collect::<Vec<String>>().await.unwrap_err();
        assert_eq!(err.kind(), "generation_unavailable");
        assert!(err.to_string().contains("model 'nope' not found"));
    }

    #[tokio::test]
    async fn test_malformed_line() {
        let body = chunks(&["not json\n"]);
        let err = decode_text(body).try_collect::<Vec<String>>().await.unwrap_err();
        assert_eq!(err.kind(), "generation_unavailable");
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let parts: Vec<std::result::Result<Vec<u8>, String>> = vec![
            Ok(b"{\"message\":{\"content\":\"a\"},\"done\":false}\n".to_vec()),
            Err("connection reset".to_string()),
            Ok(b"{\"message\":{\"content\":\"b\"},\"done\":false}\n".to_vec()),
        ];
        let items: Vec<Result<String>> = decode_text(stream::iter(parts)).collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "a");
        assert!(items[1].as_ref().is_err());
    }
}
