//! Argument parsing for the `incredible` binary.

use anyhow::{Context, bail};
use serde_json::Value;

use crate::function_registry::PRESETS;
use crate::workflows::finance::parse_symbols;

pub const DEFAULT_HOURS_BACK: u32 = 24;
pub const DEFAULT_TOPIC: &str = "AI and Machine Learning Trends";
pub const HELLO_PROMPT: &str = "Hello! What can you help me with?";

/// Model names the service advertises, with their availability.
pub const KNOWN_MODELS: &[(&str, &str)] = &[
    ("small-1", "available now, fast and efficient"),
    ("tiny-1", "coming soon, ultra fast"),
    ("big-1", "coming soon, more powerful"),
    ("huge-1", "coming soon, most advanced"),
];

pub const USAGE: &str = "\
usage: incredible <command> [args]

commands:
  hello                                   ask a single greeting question
  ask [--stream] [--model M] [--system S] [--integration ID]... <prompt...>
  chat [--model M]                        interactive conversation
  models                                  list known models
  functions [--preset] <set> <prompt...>  run the function-calling agent (calculator,
                                          assistant, toolkit, extraction, scheduling,
                                          stocks, dungeon, writer)
  integrations                            list available integrations
  connect <id> [--api-key K | --callback-url U]
  execute <id> <feature> [json-inputs]
  leads [--hours N]                       scan Gmail for sales leads
  meetings [--hours N]                    organise meeting requests
  email-automation                        auto-respond to support email
  research [topic...]                     research report for a topic
  content [topic...]                      generate content documents
  finance [--symbols A,B]                 financial dashboard update
  help                                    show this message";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Hello,
    Ask {
        prompt: String,
        stream: bool,
        model: Option<String>,
        system: Option<String>,
        /// Catalog ids enabled for the completion.
        integrations: Vec<String>,
    },
    Chat {
        model: Option<String>,
    },
    Models,
    Functions {
        preset: String,
        prompt: String,
    },
    Integrations,
    Connect {
        id: String,
        api_key: Option<String>,
        callback_url: Option<String>,
    },
    Execute {
        id: String,
        feature: String,
        inputs: Value,
    },
    Leads {
        hours: u32,
    },
    Meetings {
        hours: u32,
    },
    EmailAutomation,
    Research {
        topic: String,
    },
    Content {
        topic: String,
    },
    Finance {
        symbols: Option<Vec<String>>,
    },
    Help,
}

/// Splits `args` into `--flag value` pairs, bare `--switch`es and positionals.
struct Args {
    positional: Vec<String>,
    options: Vec<(String, Option<String>)>,
}

impl Args {
    fn split(args: &[String], switches: &[&str]) -> anyhow::Result<Self> {
        let mut positional = Vec::new();
        let mut options = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                positional.push(arg.clone());
                continue;
            };
            if switches.contains(&name) {
                options.push((name.to_string(), None));
                continue;
            }
            let value = iter
                .next()
                .with_context(|| format!("--{name} needs a value"))?;
            options.push((name.to_string(), Some(value.clone())));
        }
        Ok(Self { positional, options })
    }

    fn flag(&self, name: &str) -> bool {
        self.options.iter().any(|(k, _)| k == name)
    }

    fn value(&self, name: &str) -> Option<String> {
        self.options
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| v.clone())
    }

    fn values(&self, name: &str) -> Vec<String> {
        self.options
            .iter()
            .filter(|(k, _)| k == name)
            .filter_map(|(_, v)| v.clone())
            .collect()
    }

    fn reject_unknown(&self, allowed: &[&str]) -> anyhow::Result<()> {
        if let Some((name, _)) = self.options.iter().find(|(k, _)| !allowed.contains(&k.as_str())) {
            bail!("unknown option --{name}");
        }
        Ok(())
    }

    fn rest(&self) -> String {
        self.positional.join(" ")
    }

    fn hours(&self) -> anyhow::Result<u32> {
        match self.value("hours") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("--hours expects a whole number, got {raw:?}")),
            None => Ok(DEFAULT_HOURS_BACK),
        }
    }
}

fn topic_or_default(topic: String) -> String {
    if topic.trim().is_empty() {
        DEFAULT_TOPIC.to_string()
    } else {
        topic
    }
}

/// Parses everything after the program name.
pub fn parse(args: &[String]) -> anyhow::Result<Command> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    let command = match name.as_str() {
        "hello" => Command::Hello,
        "ask" => {
            let a = Args::split(rest, &["stream"])?;
            a.reject_unknown(&["stream", "model", "system", "integration"])?;
            let prompt = a.rest();
            if prompt.trim().is_empty() {
                bail!("ask needs a prompt");
            }
            Command::Ask {
                prompt,
                stream: a.flag("stream"),
                model: a.value("model"),
                system: a.value("system"),
                integrations: a.values("integration"),
            }
        }
        "chat" => {
            let a = Args::split(rest, &[])?;
            a.reject_unknown(&["model"])?;
            Command::Chat { model: a.value("model") }
        }
        "models" => Command::Models,
        "functions" => {
            let a = Args::split(rest, &[])?;
            a.reject_unknown(&["preset"])?;
            let (preset, words) = match a.value("preset") {
                Some(preset) => (preset, a.positional.as_slice()),
                None => match a.positional.split_first() {
                    Some((preset, words)) => (preset.clone(), words),
                    None => bail!("functions needs one of: {}", PRESETS.join(", ")),
                },
            };
            if !PRESETS.contains(&preset.as_str()) {
                bail!("unknown function set {preset:?}; expected one of: {}", PRESETS.join(", "));
            }
            let prompt = words.join(" ");
            if prompt.trim().is_empty() {
                bail!("functions needs a prompt");
            }
            Command::Functions { preset, prompt }
        }
        "integrations" => Command::Integrations,
        "connect" => {
            let a = Args::split(rest, &[])?;
            a.reject_unknown(&["api-key", "callback-url"])?;
            let [id] = a.positional.as_slice() else {
                bail!("connect needs exactly one integration id");
            };
            let api_key = a.value("api-key");
            let callback_url = a.value("callback-url");
            if api_key.is_some() && callback_url.is_some() {
                bail!("use either --api-key or --callback-url, not both");
            }
            Command::Connect {
                id: id.clone(),
                api_key,
                callback_url,
            }
        }
        "execute" => {
            let a = Args::split(rest, &[])?;
            a.reject_unknown(&[])?;
            let (id, feature, raw) = match a.positional.as_slice() {
                [id, feature] => (id, feature, None),
                [id, feature, raw] => (id, feature, Some(raw)),
                _ => bail!("execute needs <id> <feature> [json-inputs]"),
            };
            let inputs = match raw {
                Some(raw) => serde_json::from_str(raw).context("inputs must be valid JSON")?,
                None => Value::Object(Default::default()),
            };
            Command::Execute {
                id: id.clone(),
                feature: feature.clone(),
                inputs,
            }
        }
        "leads" => {
            let a = Args::split(rest, &[])?;
            a.reject_unknown(&["hours"])?;
            Command::Leads { hours: a.hours()? }
        }
        "meetings" => {
            let a = Args::split(rest, &[])?;
            a.reject_unknown(&["hours"])?;
            Command::Meetings { hours: a.hours()? }
        }
        "email-automation" => Command::EmailAutomation,
        "research" => Command::Research {
            topic: topic_or_default(rest.join(" ")),
        },
        "content" => Command::Content {
            topic: topic_or_default(rest.join(" ")),
        },
        "finance" => {
            let a = Args::split(rest, &[])?;
            a.reject_unknown(&["symbols"])?;
            let symbols = a.value("symbols").map(|raw| parse_symbols(&raw));
            Command::Finance {
                symbols: symbols.filter(|s| !s.is_empty()),
            }
        }
        "help" | "--help" | "-h" => Command::Help,
        other => bail!("unknown command {other:?}\n\n{USAGE}"),
    };
    Ok(command)
}
