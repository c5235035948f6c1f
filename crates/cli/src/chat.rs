use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use inventory_loader::{TableCache, TableSource};
use inventory_protocol::{serialize_json, LookupResponse};
use inventory_search::{IntentClassifier, QueryEngine, QueryIntent};
use inventory_table::Field;

use crate::render::lookup_text;

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "thoát"];

pub struct ChatOptions {
    pub fields: Vec<Field>,
    pub limit: usize,
    /// One JSON response per line instead of text
    pub json: bool,
}

/// Answer prompts from `input` until EOF or an exit word.
///
/// Every lookup reads the cache, so an export edited on disk is picked up
/// once the freshness window has passed. Returns the number of answers.
pub fn run_chat<S, R, W>(
    cache: &TableCache<S>,
    engine: &QueryEngine,
    options: &ChatOptions,
    input: R,
    mut out: W,
) -> Result<usize>
where
    S: TableSource,
    R: BufRead,
    W: Write,
{
    let messages = engine.messages();
    if !options.json {
        let table = cache.get();
        writeln!(out, "{}", messages.greeting())?;
        if !table.is_empty() && !table.has_serial() {
            writeln!(out, "{}", messages.missing_serial())?;
        }
        write!(out, "> ")?;
        out.flush()?;
    }

    let mut answered = 0usize;
    for line in input.lines() {
        let line = line.context("Failed to read prompt")?;
        let prompt = line.trim();
        if EXIT_WORDS.iter().any(|word| prompt.eq_ignore_ascii_case(word)) {
            break;
        }
        if prompt.is_empty() {
            if !options.json {
                write!(out, "> ")?;
                out.flush()?;
            }
            continue;
        }

        let intent = IntentClassifier::classify(prompt);
        log::debug!("prompt '{prompt}' classified as {intent:?}");
        let canned = match intent {
            QueryIntent::Greeting => Some(messages.greeting()),
            QueryIntent::Help => Some(messages.help()),
            QueryIntent::Lookup => None,
        };

        match canned {
            Some(message) if options.json => {
                let response = LookupResponse::canned(prompt, intent, message);
                writeln!(out, "{}", serialize_json(&response)?)?;
            }
            Some(message) => writeln!(out, "{message}\n")?,
            None => {
                let table = cache.get();
                let outcome = engine.search(prompt, &table);
                if options.json {
                    let mut response =
                        LookupResponse::from_outcome(prompt, &outcome, &table, &options.fields);
                    response.truncate_items(options.limit);
                    writeln!(out, "{}", serialize_json(&response)?)?;
                } else {
                    writeln!(
                        out,
                        "{}",
                        lookup_text(messages, &table, &outcome, &options.fields, options.limit)
                    )?;
                }
            }
        }
        answered += 1;

        if !options.json {
            write!(out, "> ")?;
        }
        out.flush()?;
    }
    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_loader::InMemorySource;
    use inventory_search::Locale;
    use inventory_table::{Normalizer, RawTable};
    use std::time::Duration;

    fn cache() -> TableCache<InMemorySource> {
        let raw = RawTable::from_rows(
            &["Tên hàng hóa", "Từ serial", "NHÂN VIÊN NHẬN"],
            &[
                &["Switch", "", ""],
                &["", "SW1", "An"],
                &["", "SW2", "Bình"],
            ],
        );
        TableCache::new(
            InMemorySource::new("inline", raw),
            Normalizer::default(),
            Duration::from_secs(60),
        )
    }

    fn chat(input: &str, json: bool) -> (usize, String) {
        let options = ChatOptions {
            fields: vec![Field::Serial, Field::Holder],
            limit: 10,
            json,
        };
        let mut out = Vec::new();
        let answered = run_chat(
            &cache(),
            &QueryEngine::new(Locale::En),
            &options,
            input.as_bytes(),
            &mut out,
        )
        .unwrap();
        (answered, String::from_utf8(out).unwrap())
    }

    #[test]
    fn text_session_answers_until_exit() {
        let (answered, out) = chat("hello\nsw1\n\nquit\nsw2\n", false);
        assert_eq!(answered, 2);
        assert!(out.contains("Found by serial: sw1"), "{out}");
        assert!(out.contains("1 result(s) found."), "{out}");
        assert!(out.contains("SW1"));
        assert!(!out.contains("SW2 "), "{out}");
    }

    #[test]
    fn json_session_emits_one_response_per_prompt() {
        let (answered, out) = chat("help\nswitch\n", true);
        assert_eq!(answered, 2);
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["intent"], "help");
        assert_eq!(lines[1]["stage"], "product_name");
        assert_eq!(lines[1]["count"], 2);
    }
}
