use crate::span::Pos;

#[derive(Clone, Debug)]
pub enum Level {
    Error,
    Warning,
}

#[derive(Clone, Debug)]
pub struct Diag {
    pub level: Level,
    pub message: String,
    pub pos: Pos,
}

#[derive(Default, Debug)]
pub struct Diagnostics {
    diags: Vec<Diag>,
}

impl Diagnostics {
    pub fn error<S: Into<String>>(&mut self, pos: Pos, message: S) {
        self.diags.push(Diag {
            level: Level::Error,
            message: message.into(),
            pos,
        });
    }

    pub fn warning<S: Into<String>>(&mut self, pos: Pos, message: S) {
        self.diags.push(Diag {
            level: Level::Warning,
            message: message.into(),
            pos,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diags.iter().any(|d| matches!(d.level, Level::Error))
    }

    pub fn into_vec(self) -> Vec<Diag> {
        self.diags
    }

    pub fn extend(&mut self, other: Vec<Diag>) {
        self.diags.extend(other);
    }
}

/// Internal invariant breach: never reachable from a well-formed AST.
/// Prints a one-line message and terminates with a nonzero exit status.
pub(crate) fn internal(what: &str) -> ! {
    eprintln!("internal error: {what}");
    std::process::exit(2)
}
