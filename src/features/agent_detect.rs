//! User-agent substring detection.
//!
//! Table order IS the precedence: first pattern hit wins. Reordering is
//! fragile — e.g. a generic `claude` pattern placed before `claudecode`'s
//! `claude-code`/`claude code`/`anthropic-cli` patterns would shadow it.
//! Keys here must match `CapabilityRegistry` agent names verbatim.
pub const AGENT_DETECTION_TABLE: &[(&str, &[&str])] = &[
    ("helixcode", &["helixcode"]),
    ("opencode", &["opencode"]),
    ("crush", &["crush"]),
    ("kiro", &["kiro"]),
    ("aider", &["aider"]),
    ("claudecode", &["claude-code", "claude code", "anthropic-cli"]),
    ("cline", &["cline"]),
    ("codenamegoose", &["goose", "codename-goose"]),
    ("deepseekcli", &["deepseekcli"]),
    ("forge", &["forge"]),
    ("geminicli", &["geminicli"]),
    ("gptengineer", &["gptengineer"]),
    ("kilocode", &["kilocode"]),
    ("mistralcode", &["mistralcode"]),
    ("ollamacode", &["ollamacode"]),
    ("plandex", &["plandex"]),
    ("qwencode", &["qwencode"]),
    ("amazonq", &["amazon-q", "aws-q"]),
];

/// Detect an agent from a raw `User-Agent` header value. Case-insensitive,
/// substring match, first table hit wins.
pub fn detect_agent(user_agent: &str) -> Option<&'static str> {
    let lowered = user_agent.to_lowercase();
    for (name, patterns) in AGENT_DETECTION_TABLE {
        if patterns.iter().any(|p| lowered.contains(p)) {
            return Some(name);
        }
    }
    None
}
