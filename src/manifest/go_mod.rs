//! `go.mod` detector (go family)
//!
//! Only the module path is extracted, but the whole file is checked so that a
//! broken go.mod is reported instead of yielding a half-read module name.

use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::{read_if_exists, Language, ManifestDetector, ManifestError, ProjectManifest};

const FILE_NAME: &str = "go.mod";

const DIRECTIVES: &[&str] = &[
    "module", "go", "toolchain", "godebug", "require", "exclude", "replace", "retract", "tool",
    "ignore",
];

static GO_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[1-9][0-9]*\.(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))?([a-z]+[0-9]+)?$").unwrap()
});

static TOOLCHAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(default|go1(\.(0|[1-9][0-9]*)){0,2}([a-z]+[0-9]+)?(-[0-9A-Za-z.+_-]+)?)$").unwrap()
});

static MODULE_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^v(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(-[0-9A-Za-z.-]+)?(\+[0-9A-Za-z.-]+)?$",
    )
    .unwrap()
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("go.mod:{line}: {message}")]
pub struct GoModSyntaxError {
    pub line: usize,
    pub message: String,
}

impl GoModSyntaxError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Parsed go.mod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModFile {
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Word(String),
}

/// Split one line into tokens, dropping a trailing `//` comment
fn tokenize(line: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut word = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => word.push('\n'),
                            Some('t') => word.push('\t'),
                            Some(other) => word.push(other),
                            None => return Err("unterminated quoted string".to_string()),
                        },
                        Some(other) => word.push(other),
                        None => return Err("unterminated quoted string".to_string()),
                    }
                }
                tokens.push(Token::Word(word));
            }
            '`' => {
                chars.next();
                let mut word = String::new();
                loop {
                    match chars.next() {
                        Some('`') => break,
                        Some(other) => word.push(other),
                        None => return Err("unterminated raw string".to_string()),
                    }
                }
                tokens.push(Token::Word(word));
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    break;
                }
                let mut word = String::from('/');
                let comment = read_bare(&mut chars, &mut word);
                tokens.push(Token::Word(word));
                if comment {
                    break;
                }
            }
            _ => {
                let mut word = String::new();
                let comment = read_bare(&mut chars, &mut word);
                tokens.push(Token::Word(word));
                if comment {
                    break;
                }
            }
        }
    }

    Ok(tokens)
}

/// Returns true when the word ran into a `//` comment
fn read_bare(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, word: &mut String) -> bool {
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '`') {
            return false;
        }
        if c == '/' && word.ends_with('/') {
            word.pop();
            return true;
        }
        word.push(c);
        chars.next();
    }
    false
}

fn words(tokens: &[Token], line: usize) -> Result<Vec<&str>, GoModSyntaxError> {
    tokens
        .iter()
        .map(|t| match t {
            Token::Word(w) => Ok(w.as_str()),
            Token::Open | Token::Close => Err(GoModSyntaxError::new(line, "unexpected parenthesis")),
        })
        .collect()
}

/// Parse go.mod content and return the declared module path
pub fn parse_go_mod(contents: &str) -> Result<GoModFile, GoModSyntaxError> {
    let mut module: Option<String> = None;
    // (directive, line where the block opened)
    let mut block: Option<(String, usize)> = None;
    let mut last_line = 0;

    for (index, raw) in contents.lines().enumerate() {
        let line = index + 1;
        last_line = line;
        let tokens = tokenize(raw).map_err(|msg| GoModSyntaxError::new(line, msg))?;
        if tokens.is_empty() {
            continue;
        }

        let open_block = block.as_ref().map(|(verb, _)| verb.clone());
        let (verb, args) = match open_block {
            Some(verb) => {
                if tokens == [Token::Close] {
                    block = None;
                    continue;
                }
                (verb, words(&tokens, line)?)
            }
            None => {
                let verb = match &tokens[0] {
                    Token::Word(w) => w.clone(),
                    Token::Close => return Err(GoModSyntaxError::new(line, "unexpected )")),
                    Token::Open => return Err(GoModSyntaxError::new(line, "unexpected (")),
                };
                if !DIRECTIVES.contains(&verb.as_str()) {
                    return Err(GoModSyntaxError::new(line, format!("unknown directive: {}", verb)));
                }
                if tokens.len() == 2 && tokens[1] == Token::Open {
                    block = Some((verb, line));
                    continue;
                }
                // `require ()` and friends
                if tokens.len() == 3 && tokens[1] == Token::Open && tokens[2] == Token::Close {
                    continue;
                }
                (verb, words(&tokens[1..], line)?)
            }
        };

        match verb.as_str() {
            "module" => {
                if args.len() != 1 {
                    return Err(GoModSyntaxError::new(line, "usage: module module/path"));
                }
                if module.is_some() {
                    return Err(GoModSyntaxError::new(line, "repeated module statement"));
                }
                module = Some(args[0].to_string());
            }
            "go" => {
                if args.len() != 1 || !GO_VERSION.is_match(args[0]) {
                    return Err(GoModSyntaxError::new(line, "usage: go 1.23.0"));
                }
            }
            "toolchain" => {
                if args.len() != 1 || !TOOLCHAIN.is_match(args[0]) {
                    return Err(GoModSyntaxError::new(line, "usage: toolchain go1.23.0"));
                }
            }
            "require" | "exclude" => {
                if args.len() != 2 {
                    return Err(GoModSyntaxError::new(line, format!("usage: {} module/path v1.2.3", verb)));
                }
                check_version(args[1], line)?;
            }
            "replace" => check_replace(&args, line)?,
            "godebug" => {
                if args.len() != 1 || !args[0].contains('=') {
                    return Err(GoModSyntaxError::new(line, "usage: godebug key=value"));
                }
            }
            "tool" | "ignore" if args.len() != 1 => {
                return Err(GoModSyntaxError::new(line, format!("usage: {} path", verb)));
            }
            _ if args.is_empty() => {
                return Err(GoModSyntaxError::new(line, format!("missing arguments for {}", verb)));
            }
            _ => {}
        }
    }

    if let Some((verb, opened)) = block {
        return Err(GoModSyntaxError::new(opened, format!("unterminated {} block", verb)));
    }

    match module {
        Some(module) if !module.is_empty() => Ok(GoModFile { module }),
        Some(_) => Err(GoModSyntaxError::new(last_line.max(1), "empty module path")),
        None => Err(GoModSyntaxError::new(last_line.max(1), "no module directive found")),
    }
}

fn check_version(version: &str, line: usize) -> Result<(), GoModSyntaxError> {
    if MODULE_VERSION.is_match(version) {
        Ok(())
    } else {
        Err(GoModSyntaxError::new(line, format!("invalid module version {:?}", version)))
    }
}

/// `old [version] => new [version]`
fn check_replace(args: &[&str], line: usize) -> Result<(), GoModSyntaxError> {
    let usage = || GoModSyntaxError::new(line, "usage: replace module/path [v1.2.3] => other/path [v1.2.3]");

    let arrow = args.iter().position(|a| *a == "=>").ok_or_else(usage)?;
    let (old, new) = (&args[..arrow], &args[arrow + 1..]);
    if !(1..=2).contains(&old.len()) || !(1..=2).contains(&new.len()) {
        return Err(usage());
    }

    if let Some(version) = old.get(1) {
        check_version(version, line)?;
    }
    if let Some(version) = new.get(1) {
        check_version(version, line)?;
    }
    Ok(())
}

pub struct GoModDetector;

#[async_trait]
impl ManifestDetector for GoModDetector {
    fn file_name(&self) -> &'static str {
        FILE_NAME
    }

    async fn detect(&self, directory: &Path) -> Result<Option<ProjectManifest>, ManifestError> {
        let Some((path, bytes)) = read_if_exists(directory, FILE_NAME).await? else {
            return Ok(None);
        };

        let parsed = String::from_utf8(bytes)
            .map_err(|_| GoModSyntaxError::new(1, "invalid UTF-8"))
            .and_then(|text| parse_go_mod(&text))
            .map_err(|source| ManifestError::GoMod { path, source })?;

        Ok(Some(ProjectManifest {
            name: Some(parsed.module),
            description: None,
            language: Language::Go,
        }))
    }
}
