use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CsvError {
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("unexpected character {found:?} after closing quote on line {line}")]
    TrailingCharacter { line: usize, found: char },
}

/// Quotes a single field, doubling embedded quotes.
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Splits CSV text into records. Quoted fields may contain separators,
/// doubled quotes and line breaks. Both `\n` and `\r\n` end a record; a
/// trailing line break does not produce an empty record.
pub fn parse(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;
    // true once the current record has any content, so "a\n" is one record
    let mut dirty = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if field.is_empty() => {
                let start_line = line;
                dirty = true;
                loop {
                    match chars.next() {
                        Some('"') => {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                field.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(ch) => {
                            if ch == '\n' {
                                line += 1;
                            }
                            field.push(ch);
                        }
                        None => return Err(CsvError::UnterminatedQuote { line: start_line }),
                    }
                }
                match chars.peek() {
                    None | Some(',') | Some('\n') | Some('\r') => {}
                    Some(&found) => return Err(CsvError::TrailingCharacter { line, found }),
                }
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                dirty = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                dirty = false;
                line += 1;
            }
            other => {
                field.push(other);
                dirty = true;
            }
        }
    }

    if dirty {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote(r#"{"x":"a,b"}"#), r#""{""x"":""a,b""}""#);
        assert_eq!(quote(""), r#""""#);
    }

    #[test]
    fn parses_plain_and_quoted_fields() {
        let records = parse("a,b,c\n\"1\",\"2,3\",\"say \"\"hi\"\"\"\n").expect("parse");
        assert_eq!(
            records,
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["1".to_string(), "2,3".to_string(), "say \"hi\"".to_string()],
            ]
        );
    }

    #[test]
    fn quoted_newlines_and_crlf() {
        let records = parse("\"line one\nline two\",x\r\ny,z").expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][0], "line one\nline two");
        assert_eq!(records[0][1], "x");
        assert_eq!(records[1], vec!["y".to_string(), "z".to_string()]);
    }

    #[test]
    fn empty_fields_are_kept() {
        let records = parse(",\n\"\",a").expect("parse");
        assert_eq!(records[0], vec![String::new(), String::new()]);
        assert_eq!(records[1], vec![String::new(), "a".to_string()]);
    }

    #[test]
    fn rejects_unterminated_quote() {
        assert_eq!(
            parse("a\n\"open,b"),
            Err(CsvError::UnterminatedQuote { line: 2 })
        );
    }

    #[test]
    fn rejects_garbage_after_closing_quote() {
        assert_eq!(
            parse("\"a\"b,c"),
            Err(CsvError::TrailingCharacter { line: 1, found: 'b' })
        );
    }
}
