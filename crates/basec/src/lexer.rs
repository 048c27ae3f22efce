use crate::diag::Diagnostics;
use crate::span::Pos;
use crate::token::{Keyword, Punct, Token, TokenKind};

/// Lex a whole Base source into tokens. Lexical errors go into `diags` and
/// lexing continues; the offending characters produce no token.
pub fn lex(src: &str, diags: &mut Diagnostics) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut line_no: u32 = 0;

    for line in src.split('\n') {
        line_no += 1;
        let bytes = line.as_bytes();
        let mut i = 0usize;

        while i < bytes.len() {
            let ch = line[i..].chars().next().unwrap();
            // columns are 1-based character offsets within the line
            let col = line[..i].chars().count() as u32 + 1;
            let pos = Pos::new(line_no, col);

            if ch.is_whitespace() {
                i += ch.len_utf8();
                continue;
            }

            // comments run to end of line
            if ch == '$' || line[i..].starts_with("!!") {
                break;
            }

            if is_ident_start(ch) {
                let mut j = i + ch.len_utf8();
                while j < line.len() {
                    let c = line[j..].chars().next().unwrap();
                    if is_ident_continue(c) {
                        j += c.len_utf8();
                    } else {
                        break;
                    }
                }
                let text = &line[i..j];
                let kind = if let Some(kw) = Keyword::from_str(text) {
                    TokenKind::Keyword(kw)
                } else if text == "True" {
                    TokenKind::Bool(true)
                } else if text == "False" {
                    TokenKind::Bool(false)
                } else {
                    TokenKind::Ident(text.to_string())
                };
                tokens.push(Token { kind, pos });
                i = j;
                continue;
            }

            if ch.is_ascii_digit() {
                let mut j = i + 1;
                while j < line.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                let value = match line[i..j].parse::<i32>() {
                    Ok(v) => v,
                    Err(_) => {
                        diags.warning(pos, "integer literal too large - using max value");
                        i32::MAX
                    }
                };
                tokens.push(Token {
                    kind: TokenKind::Int(value),
                    pos,
                });
                i = j;
                continue;
            }

            if ch == '"' {
                let (next, token) = lex_string(line, i, pos, diags);
                if let Some(token) = token {
                    tokens.push(token);
                }
                i = next;
                continue;
            }

            if let Some((punct, width)) = match_punct(&line[i..]) {
                tokens.push(Token {
                    kind: TokenKind::Punct(punct),
                    pos,
                });
                i += width;
                continue;
            }

            diags.error(pos, format!("illegal character ignored: {ch}"));
            i += ch.len_utf8();
        }
    }

    let end = Pos::new(line_no.max(1), src.lines().last().map_or(0, |l| l.chars().count()) as u32 + 1);
    tokens.push(Token {
        kind: TokenKind::Eof,
        pos: end,
    });

    tokens
}

/// Scan a string literal starting at the opening quote. Returns the index
/// just past the literal and the token, or `None` when the literal is
/// ignored because it is unterminated or contains a bad escape.
fn lex_string(
    line: &str,
    start: usize,
    pos: Pos,
    diags: &mut Diagnostics,
) -> (usize, Option<Token>) {
    let mut j = start + 1;
    let mut out = String::new();
    let mut bad_escape = false;
    let mut terminated = false;

    while j < line.len() {
        let c = line[j..].chars().next().unwrap();
        if c == '"' {
            terminated = true;
            j += 1;
            break;
        }
        if c == '\\' {
            j += 1;
            if j >= line.len() {
                bad_escape = true;
                break;
            }
            let esc = line[j..].chars().next().unwrap();
            match esc {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                '\\' => out.push('\\'),
                '?' => out.push('?'),
                _ => bad_escape = true,
            }
            j += esc.len_utf8();
            continue;
        }
        out.push(c);
        j += c.len_utf8();
    }

    match (terminated, bad_escape) {
        (true, false) => (
            j,
            Some(Token {
                kind: TokenKind::Str(out),
                pos,
            }),
        ),
        (true, true) => {
            diags.error(pos, "string literal with bad escaped character ignored");
            (j, None)
        }
        (false, false) => {
            diags.error(pos, "unterminated string literal ignored");
            (j, None)
        }
        (false, true) => {
            diags.error(
                pos,
                "unterminated string literal with bad escaped character ignored",
            );
            (j, None)
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn match_punct(s: &str) -> Option<(Punct, usize)> {
    if s.starts_with(">>") {
        return Some((Punct::ReadOp, 2));
    }
    if s.starts_with("<<") {
        return Some((Punct::WriteOp, 2));
    }
    if s.starts_with("++") {
        return Some((Punct::PlusPlus, 2));
    }
    if s.starts_with("--") {
        return Some((Punct::MinusMinus, 2));
    }
    if s.starts_with("==") {
        return Some((Punct::EqEq, 2));
    }
    if s.starts_with("~=") {
        return Some((Punct::NotEq, 2));
    }
    if s.starts_with("<=") {
        return Some((Punct::LtEq, 2));
    }
    if s.starts_with(">=") {
        return Some((Punct::GtEq, 2));
    }
    let ch = s.chars().next()?;
    let punct = match ch {
        '{' => Punct::LBrace,
        '}' => Punct::RBrace,
        '(' => Punct::LParen,
        ')' => Punct::RParen,
        '[' => Punct::LBracket,
        ']' => Punct::RBracket,
        ':' => Punct::Colon,
        ',' => Punct::Comma,
        '.' => Punct::Dot,
        '+' => Punct::Plus,
        '-' => Punct::Minus,
        '*' => Punct::Star,
        '/' => Punct::Slash,
        '~' => Punct::Not,
        '&' => Punct::And,
        '|' => Punct::Or,
        '<' => Punct::Lt,
        '>' => Punct::Gt,
        '=' => Punct::Assign,
        _ => return None,
    };
    Some((punct, ch.len_utf8()))
}
