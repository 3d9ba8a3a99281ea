//! Package definitions and placement rules.
//!
//! The built-in package set is embedded JSON; `--config <file>` substitutes
//! an external file with the same shape. Rules are compiled (regex + mode
//! text) at load time so pattern and permission mistakes fail before any
//! network or filesystem work starts.

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Built-in package set. Same shape as an external `--config` file.
const DEFAULT_CONFIG: &str = r#"[
  {
    "name": "glibc",
    "repo": "http://mirrors.kernel.org/archlinux/core/os/x86_64/",
    "rules": [
      {
        "src": "^usr/lib/ld-.+\\.so$",
        "dest-dir": "/usr/local/lib/",
        "file-mode": "0755"
      }
    ]
  },
  {
    "name": "flashplugin",
    "repo": "http://mirrors.kernel.org/archlinux/extra/os/x86_64/",
    "rules": [
      {
        "src": "usr/lib/mozilla/plugins/libflashplayer.so",
        "dest-dir": "/usr/lib/mozilla/plugins/",
        "file-mode": "0755"
      }
    ],
    "post-install": "If you're using a grsecurity kernel do:\n\n    $ paxctl -c -m /usr/lib/firefox-<version>/plugin-container"
  }
]"#;

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,
    repo: String,
    rules: Vec<RawRule>,
    #[serde(default, rename = "post-install")]
    post_install: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    src: String,
    #[serde(rename = "dest-dir")]
    dest_dir: PathBuf,
    #[serde(rename = "file-mode")]
    file_mode: String,
}

/// One configured package: where to look for it and what to pluck out.
#[derive(Debug)]
pub struct Package {
    /// Package name, also the stem of the expected archive filename.
    pub name: String,
    /// Repository listing page URL.
    pub repo: String,
    /// Placement rules in declaration order.
    pub rules: Vec<CompiledRule>,
    /// Note printed after a successful install.
    pub post_install: Option<String>,
}

/// A placement rule with its pattern and permission text already parsed.
#[derive(Debug)]
pub struct CompiledRule {
    /// Original source text, kept for verbatim-path comparison and display.
    pub src: String,
    pattern: Regex,
    /// Destination directory; must already exist at write time.
    pub dest_dir: PathBuf,
    /// Permission bits applied to the placed file.
    pub mode: u32,
}

impl CompiledRule {
    pub fn new(src: &str, dest_dir: impl Into<PathBuf>, file_mode: &str) -> Result<Self> {
        let pattern = Regex::new(src)
            .with_context(|| format!("invalid source pattern {src:?}"))?;
        let mode = parse_file_mode(file_mode)
            .with_context(|| format!("invalid file mode {file_mode:?}"))?;
        Ok(Self {
            src: src.to_string(),
            pattern,
            dest_dir: dest_dir.into(),
            mode,
        })
    }

    /// An entry matches if its full archive-internal path equals `src`
    /// verbatim, or the pattern finds a match anywhere within it.
    pub fn matches(&self, entry_name: &str) -> bool {
        entry_name == self.src || self.pattern.is_match(entry_name)
    }
}

/// Parse permission text with the base taken from its prefix: `0x`/`0o`/`0b`
/// prefixes select their base, a bare leading zero means octal ("0755"),
/// anything else is decimal. The value is truncated to 32 bits.
pub fn parse_file_mode(text: &str) -> Result<u32> {
    let text = text.trim();
    let lower = text.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() {
        bail!("empty permission value");
    }
    let value = u64::from_str_radix(digits, radix)
        .with_context(|| format!("not a base-{radix} number: {digits:?}"))?;
    Ok(value as u32)
}

/// Load the package set from `path`, or the built-in set when `path` is None.
pub fn load(path: Option<&Path>) -> Result<Vec<Package>> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?,
        None => DEFAULT_CONFIG.to_string(),
    };
    parse(&text)
}

fn parse(text: &str) -> Result<Vec<Package>> {
    let raw: Vec<RawPackage> =
        serde_json::from_str(text).context("cannot parse package configuration")?;

    let mut packages = Vec::with_capacity(raw.len());
    for pkg in raw {
        if pkg.rules.is_empty() {
            bail!("package {} has no placement rules", pkg.name);
        }
        let mut rules = Vec::with_capacity(pkg.rules.len());
        for rule in &pkg.rules {
            let compiled = CompiledRule::new(&rule.src, &rule.dest_dir, &rule.file_mode)
                .with_context(|| format!("package {}", pkg.name))?;
            if !compiled.dest_dir.is_absolute() {
                bail!(
                    "package {}: dest-dir {} is not absolute",
                    pkg.name,
                    compiled.dest_dir.display()
                );
            }
            rules.push(compiled);
        }
        packages.push(Package {
            name: pkg.name,
            repo: pkg.repo,
            rules,
            post_install: pkg.post_install,
        });
    }
    Ok(packages)
}
