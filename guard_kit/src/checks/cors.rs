//! # CORS Safety Check
//!
//! Flags allow-all origins in the Express CORS configuration of the server
//! entry point and rewrites them to an allow-list callback.
//!
//! Matching is literal: `origin: '*'` and `origin: true`. The target file is
//! not parsed, so the rewrite is a plain text substitution.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Check, CheckResult, FixOutcome, Severity};
use crate::error::{GuardError, GuardResult};

pub const CHECK_ID: &str = "cors_safety";
pub const CHECK_NAME: &str = "CORS Safety";

/// Allow-all origin literals
pub const UNSAFE_ORIGIN_PATTERNS: [&str; 2] = ["origin: '*'", "origin: true"];

const ALLOW_LIST_IDENT: &str = "allowedOrigins";

/// `allowedOrigins` bound by a declaration, plain or destructured
static ALLOW_LIST_BINDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:const|let|var)(?:\s+|\s*\{[^}]*?\b)allowedOrigins\b").unwrap()
});

const SAFE_ORIGIN_CALLBACK: &str = "origin: (origin, callback) => {
        if (!origin || allowedOrigins.includes(origin)) {
            callback(null, true);
        } else {
            callback(new Error('Not allowed by CORS'));
        }
    }";

/// Environment variable the patched server reads its origins from
pub const DEFAULT_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

/// Fallback allow-list when the variable is unset
pub const DEFAULT_ORIGINS: [&str; 1] = ["http://localhost:3000"];

pub fn default_origins() -> Vec<String> {
    DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect()
}

/// Check for wildcard CORS origins in a server entry point
pub struct CorsCheck {
    target: PathBuf,
    origins_env: String,
    default_origins: Vec<String>,
}

impl CorsCheck {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            origins_env: DEFAULT_ORIGINS_ENV.to_string(),
            default_origins: default_origins(),
        }
    }

    /// Configure the allow-list declaration inserted by `fix()`
    pub fn with_origins(mut self, origins_env: impl Into<String>, defaults: Vec<String>) -> Self {
        self.origins_env = origins_env.into();
        self.default_origins = defaults;
        self
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Read the target, `None` when it does not exist
    fn read_target(&self) -> GuardResult<Option<String>> {
        match fs::read_to_string(&self.target) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GuardError::io(&self.target, e)),
        }
    }

    /// Patched content, or `None` when nothing needs changing
    fn remediate(&self, content: &str) -> Option<String> {
        if !has_unsafe_origin(content) {
            return None;
        }

        let mut patched = content.to_string();
        for pattern in UNSAFE_ORIGIN_PATTERNS {
            patched = patched.replace(pattern, SAFE_ORIGIN_CALLBACK);
        }

        if !declares_allow_list(&patched) {
            patched = insert_before_cors_statement(&patched, &self.allow_list_declaration());
        }

        Some(patched)
    }

    /// Remediate through `write`; a write error is fatal
    fn fix_with<W>(&self, write: W) -> GuardResult<FixOutcome>
    where
        W: FnOnce(&Path, &str) -> io::Result<()>,
    {
        let content = match self.read_target()? {
            Some(content) => content,
            None => return Ok(FixOutcome::AlreadyCompliant),
        };

        let patched = match self.remediate(&content) {
            Some(patched) => patched,
            None => return Ok(FixOutcome::AlreadyCompliant),
        };

        write(&self.target, &patched).map_err(|e| GuardError::io(&self.target, e))?;
        log::info!(
            "[CORS] Rewrote wildcard origin in {}",
            self.target.display()
        );

        Ok(FixOutcome::Applied {
            note: format!(
                "Fixed CORS wildcard vulnerability in {}.",
                self.target.display()
            ),
        })
    }

    fn allow_list_declaration(&self) -> String {
        let defaults: Vec<String> = self
            .default_origins
            .iter()
            .map(|origin| js_single_quoted(origin))
            .collect();

        format!(
            "const {ident} = process.env.{env}\n    ? process.env.{env}.split(',')\n    : [{defaults}];\n",
            ident = ALLOW_LIST_IDENT,
            env = self.origins_env,
            defaults = defaults.join(", ")
        )
    }
}

impl Check for CorsCheck {
    fn id(&self) -> &str {
        CHECK_ID
    }

    fn name(&self) -> &str {
        CHECK_NAME
    }

    fn run(&self) -> GuardResult<CheckResult> {
        let content = match self.read_target()? {
            Some(content) => content,
            None => {
                log::debug!(
                    "[CORS] {} not present, nothing to inspect",
                    self.target.display()
                );
                return Ok(CheckResult::pass(CHECK_NAME));
            }
        };

        if has_unsafe_origin(&content) {
            log::warn!("[CORS] Unsafe CORS policy detected (wildcard/allow-all)");
            return Ok(CheckResult::violation(
                CHECK_NAME,
                Severity::Low,
                "Wildcard origin detected in Express CORS config.",
            )
            .with_autofix());
        }

        Ok(CheckResult::pass(CHECK_NAME))
    }

    fn fix(&self) -> GuardResult<FixOutcome> {
        self.fix_with(|path, content| fs::write(path, content))
    }

    fn fix_targets(&self) -> Vec<PathBuf> {
        vec![self.target.clone()]
    }
}

fn has_unsafe_origin(content: &str) -> bool {
    UNSAFE_ORIGIN_PATTERNS
        .iter()
        .any(|pattern| content.contains(pattern))
}

fn declares_allow_list(content: &str) -> bool {
    ALLOW_LIST_BINDING.is_match(content)
}

/// Offset of the line opening the top-level statement that contains `idx`
///
/// Tracks bracket depth outside string literals and `//` comments. The
/// last line that starts at depth zero opens the statement.
fn statement_start(content: &str, idx: usize) -> usize {
    let mut depth: usize = 0;
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut in_comment = false;
    let mut prev = '\n';

    for (i, c) in content[..idx].char_indices() {
        if prev == '\n' && depth == 0 && quote.is_none() {
            start = i;
        }
        prev = c;

        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '/' if content[i + 1..].starts_with('/') => in_comment = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    start
}

/// Insert `snippet` on its own line ahead of the statement holding the
/// first `cors(` call, or at the top when there is none
fn insert_before_cors_statement(content: &str, snippet: &str) -> String {
    let at = content
        .find("cors(")
        .map(|idx| statement_start(content, idx))
        .unwrap_or(0);

    let mut out = String::with_capacity(content.len() + snippet.len() + 1);
    out.push_str(&content[..at]);
    out.push_str(snippet);
    out.push('\n');
    out.push_str(&content[at..]);
    out
}

fn js_single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
