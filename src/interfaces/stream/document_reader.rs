use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Splits a stream of local-interface requests into documents. A blank line
/// ends a document, so a pretty-printed request can span several lines as
/// long as none of them is empty.
pub struct DocumentReader<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> DocumentReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            lines: source.lines(),
        }
    }

    /// The next document, or `None` once the input is exhausted.
    pub async fn next_document(&mut self) -> std::io::Result<Option<String>> {
        let mut document = String::new();
        while let Some(line) = self.lines.next_line().await? {
            if line.trim().is_empty() {
                if document.is_empty() {
                    continue;
                }
                return Ok(Some(document));
            }
            if !document.is_empty() {
                document.push('\n');
            }
            document.push_str(&line);
        }
        Ok((!document.is_empty()).then_some(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_lines_separate_documents() {
        let input = "\n<a>\n  <b>1</b>\n</a>\n\n\n<c/>\r\n\r\n<d/>";
        let mut reader = DocumentReader::new(input.as_bytes());

        assert_eq!(
            reader.next_document().await.unwrap().as_deref(),
            Some("<a>\n  <b>1</b>\n</a>")
        );
        assert_eq!(reader.next_document().await.unwrap().as_deref(), Some("<c/>"));
        assert_eq!(reader.next_document().await.unwrap().as_deref(), Some("<d/>"));
        assert_eq!(reader.next_document().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_input_has_no_documents() {
        let mut reader = DocumentReader::new("\n  \n".as_bytes());
        assert_eq!(reader.next_document().await.unwrap(), None);
    }
}
