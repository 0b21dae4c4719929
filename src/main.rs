use clap::{Parser, Subcommand};
use cmdnorm::codec::{self, TokenOptions};
use cmdnorm::{CommandGrammar, NormalizeError, Normalized, Normalizer, Settings};
use serde_json::json;
use std::io::BufRead;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cmdnorm")]
#[command(about = "Normalize shell commands into canonical typed trees")]
#[command(version)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Grammar table (JSON or YAML) overlaid on the built-in one
    #[arg(long, global = true)]
    grammar: Option<PathBuf>,

    /// Output one JSON object per command
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the canonical tree and the repairs applied
    Normalize {
        /// Command to normalize; read one per stdin line when omitted
        command: Option<String>,
    },
    /// Print the canonical command tokens
    Tokens {
        /// Degrade instead of failing on malformed trees
        #[arg(long)]
        loose: bool,
        /// Sort the flags and arguments of each command
        #[arg(long)]
        sort_flags: bool,
        /// Print argument types instead of values
        #[arg(long)]
        types: bool,
        /// Print arguments as kind-prefixed symbols
        #[arg(long)]
        symbols: bool,
        command: Option<String>,
    },
    /// Print the symbol stream of the canonical tree
    Symbols { command: Option<String> },
    /// Rebuild a tree from a symbol stream
    Decode {
        /// Symbols; read one whitespace-separated stream per stdin line when omitted
        symbols: Vec<String>,
    },
    /// Print the canonical tree without argument values
    Prune { command: Option<String> },
    /// Compare two commands structurally
    Compare {
        left: String,
        right: String,
        /// Treat arguments of different types as equal
        #[arg(long)]
        ignore_types: bool,
    },
    /// Print the effective grammar table as JSON
    Grammar,
}

/// Result of one command, in both output forms.
struct Report {
    text: String,
    json: serde_json::Value,
}

struct App {
    grammar: CommandGrammar,
    settings: Settings,
    json: bool,
}

impl App {
    fn normalize(&self, command: &str) -> Result<Normalized, NormalizeError> {
        Normalizer::with_options(&self.grammar, self.settings.normalize.clone()).normalize_text(command)
    }

    fn print(&self, report: &Report) {
        if self.json {
            println!("{}", report.json);
        } else {
            println!("{}", report.text.trim_end_matches('\n'));
        }
    }

    fn print_error(&self, input: &str, kind: &str, message: &str) {
        if self.json {
            println!("{}", json!({ "command": input, "error": kind, "message": message }));
        } else {
            eprintln!("{}: {}", kind, message);
        }
    }

    /// Run `f` on `input`, or on every non-blank stdin line when `input` is
    /// absent. Returns whether every command succeeded.
    fn each<F>(&self, input: Option<&str>, f: F) -> bool
    where
        F: Fn(&Self, &str) -> Result<Report, (String, String)>,
    {
        let run = |line: &str| match f(self, line) {
            Ok(report) => {
                self.print(&report);
                true
            }
            Err((kind, message)) => {
                self.print_error(line, &kind, &message);
                false
            }
        };

        match input {
            Some(line) => run(line),
            None => {
                let mut ok = true;
                for line in std::io::stdin().lock().lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            eprintln!("Error: cannot read stdin: {}", e);
                            return false;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    ok &= run(&line);
                }
                ok
            }
        }
    }
}

fn failure(err: NormalizeError) -> (String, String) {
    (err.kind().to_string(), err.to_string())
}

fn codec_failure(err: codec::CodecError) -> (String, String) {
    ("CodecError".to_string(), err.to_string())
}

fn normalize_report(app: &App, command: &str) -> Result<Report, (String, String)> {
    let out = app.normalize(command).map_err(failure)?;
    let mut text = out.tree.to_string();
    for diagnostic in &out.diagnostics {
        text.push_str(&format!("repair: {}\n", diagnostic));
    }
    let diagnostics: Vec<_> = out
        .diagnostics
        .iter()
        .map(|d| json!({ "kind": d.kind.as_str(), "message": d.message }))
        .collect();
    Ok(Report {
        text,
        json: json!({
            "command": out.command,
            "tree": out.tree.to_string(),
            "tokens": codec::to_tokens(&out.tree, TokenOptions { loose_constraints: true, ..TokenOptions::default() })
                .unwrap_or_default(),
            "diagnostics": diagnostics,
        }),
    })
}

fn tokens_report(app: &App, command: &str, options: TokenOptions) -> Result<Report, (String, String)> {
    let out = app.normalize(command).map_err(failure)?;
    let tokens = codec::to_tokens(&out.tree, options).map_err(codec_failure)?;
    Ok(Report {
        text: tokens.join(" "),
        json: json!({ "command": out.command, "tokens": tokens }),
    })
}

fn symbols_report(app: &App, command: &str) -> Result<Report, (String, String)> {
    let out = app.normalize(command).map_err(failure)?;
    let symbols = codec::to_symbols(&out.tree);
    Ok(Report {
        text: symbols.join(" "),
        json: json!({ "command": out.command, "symbols": symbols }),
    })
}

fn decode_report(app: &App, symbols: &[&str]) -> Result<Report, (String, String)> {
    let tree = codec::from_symbols(symbols, &app.grammar).map_err(codec_failure)?;
    let options = TokenOptions {
        loose_constraints: true,
        ..app.settings.tokens
    };
    let tokens = codec::to_tokens(&tree, options).map_err(codec_failure)?;
    Ok(Report {
        text: format!("{}{}", tree, tokens.join(" ")),
        json: json!({ "tree": tree.to_string(), "tokens": tokens }),
    })
}

fn prune_report(app: &App, command: &str) -> Result<Report, (String, String)> {
    let out = app.normalize(command).map_err(failure)?;
    let pruned = cmdnorm::prune(&out.tree);
    Ok(Report {
        text: pruned.to_string(),
        json: json!({ "command": out.command, "tree": pruned.to_string() }),
    })
}

fn load(cli: &Cli) -> Result<App, String> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path).map_err(|e| e.to_string())?,
        None => Settings::default(),
    };
    if let Some(path) = &cli.grammar {
        settings.grammar = Some(path.clone());
    }
    let grammar = settings.grammar().map_err(|e| e.to_string())?;
    Ok(App {
        grammar,
        settings,
        json: cli.json,
    })
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let app = match load(&cli) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let ok = match &cli.command {
        Command::Normalize { command } => app.each(command.as_deref(), normalize_report),
        Command::Tokens {
            loose,
            sort_flags,
            types,
            symbols,
            command,
        } => {
            let base = app.settings.tokens;
            let options = TokenOptions {
                loose_constraints: base.loose_constraints || *loose,
                ignore_flag_order: base.ignore_flag_order || *sort_flags,
                arg_type_only: base.arg_type_only || *types,
                with_arg_type: base.with_arg_type || *symbols,
            };
            app.each(command.as_deref(), |app, line| tokens_report(app, line, options))
        }
        Command::Symbols { command } => app.each(command.as_deref(), symbols_report),
        Command::Decode { symbols } if !symbols.is_empty() => {
            let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
            app.each(Some(""), |app, _| decode_report(app, &symbols))
        }
        Command::Decode { .. } => app.each(None, |app, line| {
            decode_report(app, &line.split_whitespace().collect::<Vec<_>>())
        }),
        Command::Prune { command } => app.each(command.as_deref(), prune_report),
        Command::Compare {
            left,
            right,
            ignore_types,
        } => {
            let normalize = |command: &str| {
                app.normalize(command).map_err(|e| {
                    let (kind, message) = failure(e);
                    app.print_error(command, &kind, &message);
                })
            };
            let (Ok(a), Ok(b)) = (normalize(left), normalize(right)) else {
                std::process::exit(2);
            };
            let difference = cmdnorm::tree::diff(&a.tree, &b.tree, *ignore_types);
            app.print(&Report {
                text: difference.clone().unwrap_or_else(|| "equal".to_string()),
                json: json!({ "left": left, "right": right, "equal": difference.is_none(), "diff": difference }),
            });
            difference.is_none()
        }
        Command::Grammar => match app.grammar.to_json() {
            Ok(text) => {
                println!("{}", text);
                true
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                false
            }
        },
    };

    std::process::exit(if ok { 0 } else { 1 });
}
