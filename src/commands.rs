//! Command execution.

use crate::config::Config;
use crate::Commands;
use colored::Colorize;
use scxmlkit_codec::{checksum, parse, serialize, CodecError};
use scxmlkit_model::{Document, ModelError, Node};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures reported by a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: [{}] {source}", .path.display(), .source.error_code())]
    Parse { path: PathBuf, source: CodecError },

    #[error("{}: [{}] {source}", .path.display(), .source.error_code())]
    Model { path: PathBuf, source: ModelError },

    #[error("{}: invalid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{} is not formatted", .path.display())]
    Unformatted { path: PathBuf },

    #[error("{}: output changed after re-parsing", .path.display())]
    RoundtripMismatch { path: PathBuf },

    #[error("{count} reference error(s)\n{report}")]
    ReferenceErrors { count: usize, report: String },
}

/// Executes a command and returns the formatted output.
pub fn execute(config: &Config, cmd: Commands) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Fmt {
            file,
            check,
            output,
        } => {
            let text = read_input(&file)?;
            let doc = parse_document(&file, &text)?;
            let formatted = serialize(&doc, &config.format);

            if check {
                if text.trim_end() != formatted {
                    return Err(CommandError::Unformatted { path: file }.into());
                }
                return Ok(format!("{} {}", "Formatted".green(), file.display()));
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{}\n", formatted))
                        .map_err(|source| CommandError::Write {
                            path: path.clone(),
                            source,
                        })?;
                    Ok(format!(
                        "{} {} (checksum: {})",
                        "Wrote".green(),
                        path.display().to_string().cyan(),
                        checksum(&doc, &config.format)
                    ))
                }
                None => Ok(formatted),
            }
        }

        Commands::Check { file } => {
            let text = read_input(&file)?;
            let doc = parse_document(&file, &text)?;
            let findings = doc.validate();

            if findings.is_empty() {
                return Ok(format!(
                    "{} {}: no reference errors",
                    "OK".green(),
                    file.display()
                ));
            }

            let report = findings
                .iter()
                .map(|f| format!("  {} {}", "-".yellow(), f))
                .collect::<Vec<_>>()
                .join("\n");

            if config.check.fail_on_reference_errors {
                Err(CommandError::ReferenceErrors {
                    count: findings.len(),
                    report,
                }
                .into())
            } else {
                Ok(format!(
                    "{} {}: {} reference error(s)\n{}",
                    "Warning".yellow(),
                    file.display(),
                    findings.len(),
                    report
                ))
            }
        }

        Commands::Roundtrip { file } => {
            let text = read_input(&file)?;
            let doc = parse_document(&file, &text)?;

            let first = serialize(&doc, &config.format);
            let reparsed = parse_document(&file, &first)?;
            let second = serialize(&reparsed, &config.format);

            if first != second {
                tracing::debug!(first = %first, second = %second, "round-trip mismatch");
                return Err(CommandError::RoundtripMismatch { path: file }.into());
            }

            Ok(format!(
                "{} {} ({} bytes, checksum: {})",
                "Stable".green(),
                file.display(),
                first.len(),
                checksum(&doc, &config.format)
            ))
        }

        Commands::Info { file } => {
            let text = read_input(&file)?;
            let doc = parse_document(&file, &text)?;
            Ok(format_info(&doc, &checksum(&doc, &config.format)))
        }

        Commands::Dump { file } => {
            let text = read_input(&file)?;
            let doc = parse_document(&file, &text)?;
            let json = doc.to_json().map_err(|source| CommandError::Model {
                path: file.clone(),
                source,
            })?;
            Ok(serde_json::to_string_pretty(&json)?)
        }

        Commands::FromJson { file } => {
            let text = read_input(&file)?;
            let json: serde_json::Value =
                serde_json::from_str(&text).map_err(|source| CommandError::Json {
                    path: file.clone(),
                    source,
                })?;
            let doc = Document::from_json(&json).map_err(|source| CommandError::Model {
                path: file.clone(),
                source,
            })?;
            Ok(serialize(&doc, &config.format))
        }

        Commands::Config => Ok(config.to_yaml()?.trim_end().to_string()),
    }
}

/// Reads a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String, CommandError> {
    let read_err = |source| CommandError::Read {
        path: path.to_path_buf(),
        source,
    };

    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(read_err)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).map_err(read_err)
    }
}

fn parse_document(path: &Path, text: &str) -> Result<Document, CommandError> {
    parse(text).map_err(|source| CommandError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Formats a document summary.
fn format_info(doc: &Document, checksum: &str) -> String {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    doc.walk(|node| {
        if !matches!(node, Node::Document(_)) {
            *counts.entry(node.tag()).or_default() += 1;
        }
    });
    let count = |tag: &str| counts.get(tag).copied().unwrap_or(0);

    let mut output = format!(
        "{}\n  Version: {}\n  Initial: {}\n",
        format!("Document {}", doc.name.as_deref().unwrap_or("(unnamed)").cyan()).bold(),
        doc.version,
        doc.initial.as_deref().unwrap_or("-").yellow(),
    );

    if let Some(ref datamodel) = doc.datamodel_type {
        output.push_str(&format!("  Datamodel: {}\n", datamodel));
    }
    if let Some(ref binding) = doc.binding {
        output.push_str(&format!("  Binding: {}\n", binding));
    }
    for (prefix, uri) in doc.extra_namespaces() {
        output.push_str(&format!("  Namespace: {} = {}\n", prefix, uri));
    }

    output.push_str(&format!(
        "  States: {}  Parallels: {}  Finals: {}  Histories: {}\n",
        count("state"),
        count("parallel"),
        count("final"),
        count("history")
    ));
    output.push_str(&format!(
        "  Transitions: {}  Invokes: {}  Data: {}\n",
        count("transition"),
        count("invoke"),
        count("data")
    ));
    output.push_str(&format!("  Checksum: {}", checksum));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use scxmlkit_codec::SerializeOptions;

    const SAMPLE: &str = r#"<scxml xmlns="http://www.w3.org/2005/07/scxml" version="1.0" name="door" initial="closed">
  <state id="closed">
    <transition event="open" target="opened"/>
  </state>
  <state id="opened">
    <transition event="close" target="closed"/>
  </state>
</scxml>"#;

    const DANGLING: &str = r#"<scxml xmlns="http://www.w3.org/2005/07/scxml" initial="a">
  <state id="a"><transition event="go" target="nowhere"/></state>
</scxml>"#;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_fmt_to_stdout_is_canonical() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        let file = write_temp(&dir, "door.scxml", SAMPLE);

        let output = execute(
            &Config::default(),
            Commands::Fmt {
                file,
                check: false,
                output: None,
            },
        )
        .unwrap();

        let expected = serialize(&parse(SAMPLE).unwrap(), &SerializeOptions::default());
        assert_eq!(output, expected);
    }

    #[test]
    fn test_fmt_check() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        let raw = write_temp(&dir, "raw.scxml", SAMPLE);

        let err = execute(
            &Config::default(),
            Commands::Fmt {
                file: raw,
                check: true,
                output: None,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("is not formatted"));

        let canonical = serialize(&parse(SAMPLE).unwrap(), &SerializeOptions::default());
        let formatted = write_temp(&dir, "formatted.scxml", &format!("{}\n", canonical));
        let output = execute(
            &Config::default(),
            Commands::Fmt {
                file: formatted,
                check: true,
                output: None,
            },
        )
        .unwrap();
        assert!(output.starts_with("Formatted"));
    }

    #[test]
    fn test_fmt_writes_output_file() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        let file = write_temp(&dir, "door.scxml", SAMPLE);
        let out = dir.path().join("out.scxml");

        let mut config = Config::default();
        config.format = SerializeOptions::compact();
        execute(
            &config,
            Commands::Fmt {
                file,
                check: false,
                output: Some(out.clone()),
            },
        )
        .unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert_eq!(parse(&written).unwrap(), parse(SAMPLE).unwrap());
    }

    #[test]
    fn test_check_reports_findings() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        let file = write_temp(&dir, "bad.scxml", DANGLING);

        let output = execute(&Config::default(), Commands::Check { file: file.clone() }).unwrap();
        assert!(output.contains("1 reference error(s)"));
        assert!(output.contains("nowhere"));

        let mut strict = Config::default();
        strict.check.fail_on_reference_errors = true;
        let err = execute(&strict, Commands::Check { file }).unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_check_clean_document() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        let file = write_temp(&dir, "door.scxml", SAMPLE);

        let output = execute(&Config::default(), Commands::Check { file }).unwrap();
        assert!(output.contains("no reference errors"));
    }

    #[test]
    fn test_roundtrip_is_stable() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        let file = write_temp(&dir, "door.scxml", SAMPLE);

        let output = execute(&Config::default(), Commands::Roundtrip { file }).unwrap();
        assert!(output.starts_with("Stable"));
    }

    #[test]
    fn test_info_counts() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        let file = write_temp(&dir, "door.scxml", SAMPLE);

        let output = execute(&Config::default(), Commands::Info { file }).unwrap();
        assert!(output.contains("Document door"));
        assert!(output.contains("Initial: closed"));
        assert!(output.contains("States: 2"));
        assert!(output.contains("Transitions: 2"));

        let expected = checksum(&parse(SAMPLE).unwrap(), &SerializeOptions::default());
        assert!(output.ends_with(&expected));
    }

    #[test]
    fn test_dump_then_from_json() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        let file = write_temp(&dir, "door.scxml", SAMPLE);

        let json = execute(&Config::default(), Commands::Dump { file }).unwrap();
        let json_file = write_temp(&dir, "door.json", &json);

        let markup = execute(&Config::default(), Commands::FromJson { file: json_file }).unwrap();
        assert_eq!(parse(&markup).unwrap(), parse(SAMPLE).unwrap());
    }

    #[test]
    fn test_parse_error_carries_code() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        let file = write_temp(&dir, "wrong.xml", "<html/>");

        let err = execute(&Config::default(), Commands::Info { file }).unwrap_err();
        assert!(err.to_string().contains("[FORMAT_ERROR]"));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(
            &Config::default(),
            Commands::Dump {
                file: dir.path().join("absent.scxml"),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_config_prints_yaml() {
        let output = execute(&Config::default(), Commands::Config).unwrap();
        let parsed: Config = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
