use crate::command::Pipeline;

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Pipe,
    RedirectIn,
    RedirectOut,
    Background,
}

/// Turn a raw line into a pipeline descriptor. Never fails; syntax
/// problems come back in the descriptor's `error` field.
pub fn parse(line: &str) -> Pipeline {
    let tokens = match tokenize(line) {
        Ok(tokens) => tokens,
        Err(message) => return Pipeline::parse_error(message),
    };

    let mut pipeline = Pipeline::default();
    let mut stage: Vec<String> = Vec::new();
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        match token {
            Token::Word(word) => stage.push(word),
            Token::Pipe => {
                if stage.is_empty() {
                    return Pipeline::parse_error("empty command in pipeline");
                }
                pipeline.stages.push(std::mem::take(&mut stage));
            }
            Token::RedirectIn => match iter.next() {
                Some(Token::Word(path)) => {
                    if pipeline.input.is_some() {
                        return Pipeline::parse_error("duplicate input redirection");
                    }
                    pipeline.input = Some(path);
                }
                _ => return Pipeline::parse_error("expected file name after '<'"),
            },
            Token::RedirectOut => match iter.next() {
                Some(Token::Word(path)) => {
                    if pipeline.output.is_some() {
                        return Pipeline::parse_error("duplicate output redirection");
                    }
                    pipeline.output = Some(path);
                }
                _ => return Pipeline::parse_error("expected file name after '>'"),
            },
            Token::Background => {
                if iter.peek().is_some() {
                    return Pipeline::parse_error("'&' must be the last token");
                }
                pipeline.background = true;
            }
        }
    }

    if !stage.is_empty() {
        pipeline.stages.push(stage);
    } else if !pipeline.stages.is_empty() {
        // a trailing '|' left the last stage empty
        return Pipeline::parse_error("empty command in pipeline");
    }

    pipeline
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quote_char = ' ';
    let mut chars = input.chars();

    let flush = |tokens: &mut Vec<Token>, current: &mut String| {
        if !current.is_empty() {
            tokens.push(Token::Word(std::mem::take(current)));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' if !in_quotes => {
                in_quotes = true;
                quote_char = c;
            }
            '"' | '\'' if in_quotes && c == quote_char => {
                in_quotes = false;
            }
            c if c.is_whitespace() && !in_quotes => {
                flush(&mut tokens, &mut current);
            }
            '|' if !in_quotes => {
                flush(&mut tokens, &mut current);
                tokens.push(Token::Pipe);
            }
            '<' if !in_quotes => {
                flush(&mut tokens, &mut current);
                tokens.push(Token::RedirectIn);
            }
            '>' if !in_quotes => {
                flush(&mut tokens, &mut current);
                tokens.push(Token::RedirectOut);
            }
            '&' if !in_quotes => {
                flush(&mut tokens, &mut current);
                tokens.push(Token::Background);
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(format!("unmatched {} quote", quote_char));
    }
    flush(&mut tokens, &mut current);

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(stage: &[&str]) -> Vec<String> {
        stage.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn simple_command() {
        let p = parse("ls -l /tmp");
        assert_eq!(p.stages, vec![words(&["ls", "-l", "/tmp"])]);
        assert!(!p.background);
        assert!(p.error.is_none());
    }

    #[test]
    fn empty_line_is_a_no_op() {
        assert!(parse("").is_empty());
        assert!(parse("   \t ").is_empty());
    }

    #[test]
    fn pipeline_splits_on_bars() {
        let p = parse("echo hi | tr h H | wc -c");
        assert_eq!(
            p.stages,
            vec![words(&["echo", "hi"]), words(&["tr", "h", "H"]), words(&["wc", "-c"])]
        );
    }

    #[test]
    fn redirections_and_background() {
        let p = parse("sort < in.txt > out.txt &");
        assert_eq!(p.stages, vec![words(&["sort"])]);
        assert_eq!(p.input.as_deref(), Some("in.txt"));
        assert_eq!(p.output.as_deref(), Some("out.txt"));
        assert!(p.background);
    }

    #[test]
    fn quotes_protect_separators() {
        let p = parse("echo 'a | b' \"c > d\"");
        assert_eq!(p.stages, vec![words(&["echo", "a | b", "c > d"])]);
    }

    #[test]
    fn trailing_pipe_is_an_error() {
        assert!(parse("ls |").error.is_some());
        assert!(parse("| ls").error.is_some());
    }

    #[test]
    fn missing_redirect_target_is_an_error() {
        assert!(parse("ls >").error.is_some());
        assert!(parse("ls <").error.is_some());
        assert!(parse("ls > | wc").error.is_some());
    }

    #[test]
    fn background_must_be_last() {
        assert!(parse("sleep 1 & ls").error.is_some());
    }

    #[test]
    fn unmatched_quote_is_an_error() {
        assert!(parse("echo 'oops").error.is_some());
    }
}
