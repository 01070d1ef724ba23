//! Built-in exploit signature checker
//!
//! Each signature is a family of regular expressions over raw source text.
//! Matches are reported once per (rule, line), ordered by line.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Longest snippet carried in a raw finding
const MAX_SNIPPET_CHARS: usize = 100;

/// A match exactly as the checker reports it, before normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExploitFinding {
    pub rule: String,
    pub title: String,
    /// Free-form severity name; `None` means the checker had no opinion
    pub severity: Option<String>,
    /// 1-based line of the match
    pub line: Option<u32>,
    pub snippet: String,
    pub remediation: Option<String>,
}

struct Signature {
    rule: &'static str,
    title: &'static str,
    severity: &'static str,
    remediation: &'static str,
    patterns: Vec<Regex>,
    /// Matches containing this text are not reported
    unless: Option<&'static str>,
}

impl Signature {
    fn new(
        rule: &'static str,
        title: &'static str,
        severity: &'static str,
        remediation: &'static str,
        patterns: &[&str],
    ) -> Self {
        Self {
            rule,
            title,
            severity,
            remediation,
            patterns: patterns.iter().filter_map(|p| compile(rule, p)).collect(),
            unless: None,
        }
    }

    fn unless(mut self, text: &'static str) -> Self {
        self.unless = Some(text);
        self
    }
}

fn compile(rule: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(rule, error = %e, "invalid exploit signature pattern");
            None
        }
    }
}

static SIGNATURES: Lazy<Vec<Signature>> = Lazy::new(|| {
    vec![
        Signature::new(
            "dangerous-eval",
            "Dangerous dynamic evaluation",
            "high",
            "Avoid eval-style execution of strings; parse data explicitly or use a safe dispatcher.",
            &[
                r"\beval\s*\(",
                r"\bnew\s+Function\s*\(",
                r#"\bset(?:Timeout|Interval)\s*\(\s*["'`]"#,
            ],
        ),
        Signature::new(
            "hardcoded-credential",
            "Hardcoded credential",
            "high",
            "Load secrets from a secret store or the runtime environment instead of source code.",
            &[
                r#"(?i)\b\w*(?:password|passwd|pwd|secret|api[_-]?key|access[_-]?token|auth[_-]?token|private[_-]?key)\w*["']?\s*[:=]\s*["'][^"'\s]{4,}["']"#,
                r"\bAKIA[0-9A-Z]{16}\b",
                r"-----BEGIN (?:RSA |EC |OPENSSH )?PRIVATE KEY-----",
            ],
        ),
        Signature::new(
            "command-injection",
            "Command injection",
            "critical",
            "Never build shell commands from input; use argument vectors and an allow-list.",
            &[
                r#"\brequire\(\s*["']child_process["']\s*\)"#,
                r"\b(?:execSync|spawnSync|shell_exec|passthru|popen|proc_open|system)\s*\(",
                r"\bos\.(?:system|popen)\s*\(",
                r"\bsubprocess\.\w+\([^)]*shell\s*=\s*True",
                r"Runtime\.getRuntime\(\)\.exec\s*\(",
                r"\bexec\s*\([^)]*(?:\$_(?:GET|POST|REQUEST)|req\.(?:query|body|params))",
            ],
        ),
        Signature::new(
            "sql-injection",
            "SQL injection",
            "high",
            "Use parameterized queries or prepared statements for every value reaching SQL.",
            &[
                r#"(?i)["'`]\s*(?:SELECT|INSERT|UPDATE|DELETE)\b[^"'`]*["'`]\s*\+"#,
                r"(?i)`\s*(?:SELECT|INSERT|UPDATE|DELETE)\b[^`]*\$\{",
                r#"(?i)"\s*(?:SELECT|INSERT|UPDATE|DELETE)\b[^"]*\$[a-z_]"#,
                r"(?i)\b(?:mysql_query|mysqli_query)\s*\([^)]*\$_(?:GET|POST|REQUEST)",
                r"(?i)'\s*OR\s*'1'\s*=\s*'1",
            ],
        ),
        Signature::new(
            "cross-site-scripting",
            "Cross-site scripting (XSS)",
            "medium",
            "Encode output for its context and prefer textContent over innerHTML.",
            &[
                r"\.innerHTML\s*=",
                r"\bdocument\.write(?:ln)?\s*\(",
                r"dangerouslySetInnerHTML",
                r#"(?i)["']javascript:"#,
                r"(?i)\becho\b[^;\n]*\$_(?:GET|POST|REQUEST)",
            ],
        ),
        Signature::new(
            "path-traversal",
            "Path traversal",
            "high",
            "Resolve user-supplied paths against a fixed root and reject anything escaping it.",
            &[
                r"\b(?:readFile|readFileSync|createReadStream|sendFile|fopen|file_get_contents|include|include_once|require_once)\s*\([^)]*(?:\.\.[/\\]|req\.(?:query|params|body)|\$_(?:GET|POST|REQUEST))",
            ],
        ),
        Signature::new(
            "authentication-bypass",
            "Authentication bypass",
            "critical",
            "Derive authentication state from verified credentials, never from constants or request flags.",
            &[
                r"(?i)\b(?:is_?)?(?:authenticated|logged_?in|admin)\s*=\s*(?:true|1)\b",
                r#"(?i)if\s*\(\s*\$password\s*==\s*["']"#,
                r#"(?i)\$_(?:GET|POST|REQUEST)\[[^\]]*\]\s*==\s*["']admin["']"#,
            ],
        ),
        Signature::new(
            "unsafe-string-function",
            "Unbounded C string function",
            "medium",
            "Use bounded variants (strncpy, snprintf, fgets) and validate buffer sizes.",
            &[r"\b(?:strcpy|strcat|sprintf|vsprintf|gets)\s*\("],
        ),
        Signature::new(
            "insecure-deserialization",
            "Insecure deserialization",
            "high",
            "Deserialize untrusted data only with safe loaders and explicit schemas.",
            &[
                r"\bpickle\.loads?\s*\(",
                r"\byaml\.load\s*\([^)]*\)",
                r"\bunserialize\s*\(",
                r"\bMarshal\.load\b",
            ],
        )
        .unless("SafeLoader"),
        Signature::new(
            "weak-hash",
            "Weak hash algorithm",
            "low",
            "Use SHA-256 or better, and a dedicated password hash (argon2, bcrypt) for passwords.",
            &[
                r"(?i)\b(?:md5|sha1)\s*\(",
                r#"(?i)createHash\(\s*["'](?:md5|sha1)["']"#,
                r"\bhashlib\.(?:md5|sha1)\b",
            ],
        ),
    ]
});

/// Rule ids the built-in checker can report
pub fn signature_rules() -> Vec<&'static str> {
    SIGNATURES.iter().map(|s| s.rule).collect()
}

/// Scan raw source text with every built-in signature
pub fn check_exploits(code: &str) -> Vec<RawExploitFinding> {
    let line_starts = line_starts(code);
    let mut seen: HashSet<(&'static str, u32)> = HashSet::new();
    let mut findings: Vec<(u32, usize, RawExploitFinding)> = Vec::new();

    for (sig_index, signature) in SIGNATURES.iter().enumerate() {
        for pattern in &signature.patterns {
            for m in pattern.find_iter(code) {
                if signature.unless.is_some_and(|text| m.as_str().contains(text)) {
                    continue;
                }

                let line = line_for_offset(&line_starts, m.start());
                if !seen.insert((signature.rule, line)) {
                    continue;
                }

                findings.push((
                    line,
                    sig_index,
                    RawExploitFinding {
                        rule: signature.rule.to_string(),
                        title: signature.title.to_string(),
                        severity: Some(signature.severity.to_string()),
                        line: Some(line),
                        snippet: snippet_for_line(code, &line_starts, line),
                        remediation: Some(signature.remediation.to_string()),
                    },
                ));
            }
        }
    }

    findings.sort_by_key(|(line, sig_index, _)| (*line, *sig_index));
    findings.into_iter().map(|(_, _, f)| f).collect()
}

fn line_starts(code: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(code.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn line_for_offset(line_starts: &[usize], offset: usize) -> u32 {
    let index = match line_starts.binary_search(&offset) {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    };
    (index + 1) as u32
}

fn snippet_for_line(code: &str, line_starts: &[usize], line: u32) -> String {
    let index = (line as usize).saturating_sub(1);
    let start = line_starts.get(index).copied().unwrap_or(0);
    let end = line_starts
        .get(index + 1)
        .copied()
        .unwrap_or(code.len());
    code[start..end]
        .trim()
        .chars()
        .take(MAX_SNIPPET_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(findings: &[RawExploitFinding]) -> Vec<&str> {
        findings.iter().map(|f| f.rule.as_str()).collect()
    }

    #[test]
    fn test_all_patterns_compile() {
        for signature in SIGNATURES.iter() {
            assert!(!signature.patterns.is_empty(), "{}", signature.rule);
        }
        assert_eq!(signature_rules().len(), 10);
    }

    #[test]
    fn test_eval_and_hardcoded_password() {
        let code = r#"
    const password = "supersecret";
    function login(user, pass) {
        eval("console.log('User: ' + user)");
    }
"#;
        let findings = check_exploits(code);
        let rules = rules(&findings);
        assert!(rules.contains(&"dangerous-eval"));
        assert!(rules.contains(&"hardcoded-credential"));

        let secret = findings
            .iter()
            .find(|f| f.rule == "hardcoded-credential")
            .unwrap();
        assert_eq!(secret.line, Some(2));
        assert_eq!(secret.snippet, r#"const password = "supersecret";"#);

        let eval = findings.iter().find(|f| f.rule == "dangerous-eval").unwrap();
        assert_eq!(eval.line, Some(4));
    }

    #[test]
    fn test_findings_sorted_by_line() {
        let code = "eval(a);\nconst api_key = 'abcd1234';\n";
        let findings = check_exploits(code);
        let lines: Vec<_> = findings.iter().map(|f| f.line.unwrap()).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_one_finding_per_rule_and_line() {
        let findings = check_exploits("eval(a); eval(b);");
        assert_eq!(rules(&findings), vec!["dangerous-eval"]);
    }

    #[test]
    fn test_env_lookup_is_not_a_hardcoded_secret() {
        let findings = check_exploits("const password = process.env.PASSWORD;");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_comparison_is_not_an_assignment() {
        let findings = check_exploits("if (isAdmin == true) { allow(); }");
        assert!(!rules(&findings).contains(&"authentication-bypass"));

        let findings = check_exploits("let isAdmin = true;");
        assert_eq!(rules(&findings), vec!["authentication-bypass"]);
    }

    #[test]
    fn test_php_injection_families() {
        let code = r#"<?php
$username = $_POST['username'];
$query = "SELECT * FROM users WHERE username = '$username'";
echo "Hello " . $_GET['name'];
system("ping " . $_GET['host']);
include($_GET['page']);
?>"#;
        let findings = check_exploits(code);
        let rules = rules(&findings);
        assert!(rules.contains(&"sql-injection"));
        assert!(rules.contains(&"cross-site-scripting"));
        assert!(rules.contains(&"command-injection"));
        assert!(rules.contains(&"path-traversal"));
    }

    #[test]
    fn test_safe_yaml_loader_is_ignored() {
        assert!(check_exploits("data = yaml.load(f, Loader=yaml.SafeLoader)").is_empty());
        let findings = check_exploits("data = yaml.load(f)");
        let rules = rules(&findings);
        assert_eq!(rules, vec!["insecure-deserialization"]);
    }

    #[test]
    fn test_clean_code_has_no_findings() {
        let code = "function add(a, b) {\n  return a + b;\n}\n";
        assert!(check_exploits(code).is_empty());
    }

    #[test]
    fn test_line_for_offset() {
        let starts = line_starts("a\nbb\nccc");
        assert_eq!(line_for_offset(&starts, 0), 1);
        assert_eq!(line_for_offset(&starts, 2), 2);
        assert_eq!(line_for_offset(&starts, 3), 2);
        assert_eq!(line_for_offset(&starts, 6), 3);
    }
}
