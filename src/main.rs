use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::{Arc, MutexGuard};

use anyhow::Context;
use chrono::Local;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use incredible::agent::{AgentOptions, ConsoleObserver, FunctionAgent, StopReason};
use incredible::api::IncredibleApi;
use incredible::cli::{self, Command, HELLO_PROMPT, KNOWN_MODELS, USAGE};
use incredible::client::IncredibleClient;
use incredible::config::Config;
use incredible::function_registry::{FunctionRegistry, PresetPaths};
use incredible::functions::dungeon::{Game, RandomDice, SharedGame};
use incredible::integrations::Integrations;
use incredible::integrations::catalog::{self, AuthKind, CATALOG};
use incredible::session::Conversation;
use incredible::sse::StreamEvent;
use incredible::types::{ChatRequest, ConnectOutcome};
use incredible::workflows::WorkflowContext;
use incredible::workflows::content::ContentGenerator;
use incredible::workflows::email_automation::EmailAutomation;
use incredible::workflows::finance::FinancialDashboard;
use incredible::workflows::leads::LeadManager;
use incredible::workflows::meetings::MeetingOrganizer;
use incredible::workflows::research::ResearchReporter;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("incredible=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

struct App {
    config: Config,
    client: Arc<IncredibleClient>,
}

impl App {
    fn load() -> anyhow::Result<Self> {
        let config = Config::from_env().context("failed to load configuration (check your .env file)")?;
        let client = IncredibleClient::from_config(&config).context("failed to build HTTP client")?;
        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }

    fn api(&self) -> Arc<dyn IncredibleApi> {
        self.client.clone()
    }

    fn workflow_context(&self) -> anyhow::Result<WorkflowContext> {
        Ok(WorkflowContext::new(self.api(), self.config.clone())?)
    }

    fn integrations(&self) -> anyhow::Result<Integrations> {
        Ok(Integrations::new(self.api(), self.config.user_id()?))
    }
}

fn print_stream_event(event: &StreamEvent) {
    if let StreamEvent::Chunk { content, .. } = event {
        if event.is_thinking() {
            print!("\u{001b}[90m{}\u{001b}[0m", content);
        } else {
            print!("{}", content);
        }
        let _ = io::stdout().flush();
    }
}

async fn ask(
    app: &App,
    prompt: &str,
    stream: bool,
    model: Option<String>,
    system: Option<String>,
    integrations: &[String],
) -> anyhow::Result<()> {
    let specs = integrations
        .iter()
        .map(|id| {
            catalog::find(id)
                .map(|entry| entry.spec(None))
                .with_context(|| format!("unknown integration {id:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut conversation = Conversation::new(None, None);
    conversation.add_user(prompt);
    let model = model.unwrap_or_else(|| app.config.model.clone());
    let mut request = ChatRequest::new(model, conversation.items.clone()).with_integrations(specs);
    if let Some(system) = system {
        request = request.with_system(system);
    }

    if stream {
        let summary = app.client.chat_completion_stream(&request, print_stream_event).await?;
        println!();
        if !summary.completed {
            warn!("stream ended without a completion marker");
        }
        return Ok(());
    }

    let completion = app.client.chat_completion(&request).await?;
    match completion.text() {
        Some(text) => println!("\u{001b}[96m{}\u{001b}[0m", text.trim()),
        None => println!("\u{001b}[90m(no text in response)\u{001b}[0m"),
    }
    Ok(())
}

async fn chat(app: &App, model: Option<String>) -> anyhow::Result<()> {
    let model = model.unwrap_or_else(|| app.config.model.clone());
    let mut conversation = Conversation::new(Some("chat"), Some(model.as_str()));
    println!("\u{001b}[94mChatting with {}. Type 'help' for commands.\u{001b}[0m", model);

    loop {
        print!("\u{001b}[93mYou:\u{001b}[0m ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match input.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => println!("Commands: quit, reset, help. Anything else is sent to the model."),
            "reset" => {
                conversation.clear();
                println!("\u{001b}[90mConversation cleared.\u{001b}[0m");
            }
            text => {
                conversation.add_user(text);
                let request = ChatRequest::new(&model, conversation.items.clone()).with_system(SYSTEM_PROMPT);
                print!("\u{001b}[96mAssistant:\u{001b}[0m ");
                match app.client.chat_completion_stream(&request, print_stream_event).await {
                    Ok(summary) => {
                        println!();
                        conversation.add_assistant(&summary.content);
                    }
                    Err(e) => {
                        println!();
                        eprintln!("\u{001b}[31mError: {}\u{001b}[0m", e);
                        // drop the unanswered turn so history stays alternating
                        conversation.items.pop();
                    }
                }
            }
        }
    }
    Ok(())
}

async fn run_functions(app: &App, preset: &str, prompt: &str) -> anyhow::Result<()> {
    let paths = PresetPaths::from_config(&app.config);
    let mut opts = AgentOptions {
        model: app.config.model.clone(),
        ..AgentOptions::default()
    };
    let mut game = None;
    let registry = if preset == "dungeon" {
        let shared = start_dungeon(&paths)?;
        opts.system = Some(lock_game(&shared)?.system_prompt());
        game = Some(shared.clone());
        FunctionRegistry::dungeon(shared)
    } else {
        FunctionRegistry::preset_with(preset, &paths).with_context(|| format!("unknown function set {preset:?}"))?
    };

    let agent = FunctionAgent::new(app.api(), registry, opts);
    let mut conversation = Conversation::new(Some(preset), Some(app.config.model.as_str()));
    let run = agent.run(prompt, &mut conversation, &mut ConsoleObserver).await?;
    if run.stopped_by == StopReason::StepLimit {
        println!(
            "\u{001b}[33mStopped after {} steps without a final answer.\u{001b}[0m",
            run.steps
        );
    }

    if let Some(shared) = game {
        let game = lock_game(&shared)?;
        game.save().map_err(anyhow::Error::msg)?;
        let stats = &game.state.session_stats;
        println!(
            "\u{001b}[90mDice rolled: {} | Battles won: {} | Treasures found: {} | Skills used: {}\u{001b}[0m",
            stats.dice_rolled, stats.battles_won, stats.treasures_found, stats.skills_used
        );
    }
    Ok(())
}

/// Resumes the saved adventure, or starts a new character.
fn start_dungeon(paths: &PresetPaths) -> anyhow::Result<SharedGame> {
    let mut game = Game::new(Box::new(RandomDice), paths.save_file.clone());
    if game.load().map_err(anyhow::Error::msg)? {
        println!("\u{001b}[94mWelcome back, {}!\u{001b}[0m", game.state.player.name);
    } else {
        game.create_character("Adventurer", "Warrior");
        println!("\u{001b}[94mA new adventure begins.\u{001b}[0m");
    }
    Ok(game.shared())
}

fn lock_game(game: &SharedGame) -> anyhow::Result<MutexGuard<'_, Game>> {
    game.lock().map_err(|_| anyhow::anyhow!("game state is unavailable"))
}

async fn list_integrations(app: &App) -> anyhow::Result<()> {
    match app.client.list_integrations().await {
        Ok(list) => {
            println!("\u{001b}[94m{} integrations available\u{001b}[0m", list.len());
            for info in list {
                let name = info.name.as_deref().unwrap_or(&info.id);
                println!("  \u{001b}[1m{}\u{001b}[0m ({})", name, info.id);
                if let Some(description) = &info.description {
                    println!("    {}", description);
                }
                if !info.features.is_empty() {
                    println!("    \u{001b}[90m{}\u{001b}[0m", info.features.join(", "));
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "could not list integrations, showing built-in catalog");
            for entry in CATALOG {
                let auth = match entry.auth {
                    AuthKind::OAuth => "oauth",
                    AuthKind::ApiKey => "api key",
                };
                println!("  \u{001b}[1m{}\u{001b}[0m ({}, {})", entry.name, entry.id, auth);
                println!("    {}", entry.description);
                println!("    \u{001b}[90m{}\u{001b}[0m", entry.features.join(", "));
            }
        }
    }
    Ok(())
}

async fn connect(
    app: &App,
    id: &str,
    api_key: Option<String>,
    callback_url: Option<String>,
) -> anyhow::Result<()> {
    let integrations = app.integrations()?;
    let outcome = match api_key {
        Some(key) => integrations.connect_api_key(id, &key).await?,
        None => integrations.connect_oauth(id, callback_url.as_deref()).await?,
    };
    match outcome {
        ConnectOutcome::Redirect(url) => {
            println!("Open this URL to finish connecting {}:", id);
            println!("\u{001b}[4m{}\u{001b}[0m", url);
        }
        ConnectOutcome::Linked => println!("\u{001b}[32m✔ {} connected\u{001b}[0m", id),
        ConnectOutcome::Rejected(reason) => anyhow::bail!("connecting {id} failed: {reason}"),
    }
    Ok(())
}

async fn run(command: Command) -> anyhow::Result<()> {
    if let Command::Help = command {
        println!("{}", USAGE);
        return Ok(());
    }
    if let Command::Models = command {
        println!("\u{001b}[94mKnown models:\u{001b}[0m");
        for (name, status) in KNOWN_MODELS {
            println!("  {:<8} {}", name, status);
        }
        return Ok(());
    }

    let app = App::load()?;
    match command {
        Command::Hello => {
            println!("\u{001b}[93mYou:\u{001b}[0m {}", HELLO_PROMPT);
            ask(&app, HELLO_PROMPT, false, None, None, &[]).await?;
        }
        Command::Ask {
            prompt,
            stream,
            model,
            system,
            integrations,
        } => ask(&app, &prompt, stream, model, system, &integrations).await?,
        Command::Chat { model } => chat(&app, model).await?,
        Command::Functions { preset, prompt } => run_functions(&app, &preset, &prompt).await?,
        Command::Integrations => list_integrations(&app).await?,
        Command::Connect {
            id,
            api_key,
            callback_url,
        } => connect(&app, &id, api_key, callback_url).await?,
        Command::Execute { id, feature, inputs } => {
            let response = app.integrations()?.execute(&id, &feature, inputs).await?;
            println!("{}", serde_json::to_string_pretty(&response.result)?);
            if !response.succeeded() {
                anyhow::bail!("{feature} reported failure");
            }
        }
        Command::Leads { hours } => {
            let manager = LeadManager::new(app.workflow_context()?)?;
            let report = manager.scan(hours).await;
            println!(
                "Leads: {} candidates, {} processed, {} follow-ups sent",
                report.candidates, report.processed, report.follow_ups_sent
            );
            for lead in &report.high_value {
                println!("  🔥 {} <{}> ({}) score {}", lead.name, lead.email, lead.company, lead.lead_score);
            }
        }
        Command::Meetings { hours } => {
            let organizer = MeetingOrganizer::new(app.workflow_context()?)?;
            let report = organizer.scan(hours).await;
            println!(
                "Meetings: {} candidates, {} organized",
                report.candidates, report.organized
            );
        }
        Command::EmailAutomation => {
            let automation = EmailAutomation::new(app.workflow_context()?)?;
            let report = automation.process().await;
            println!(
                "Emails: {} processed, {} auto-responses sent",
                report.processed, report.responses_sent
            );
        }
        Command::Research { topic } => {
            let reporter = ResearchReporter::new(app.workflow_context()?)?;
            let outcome = reporter.run(&topic).await?;
            println!(
                "Research on {:?}: {} findings from {} sources, emailed to {} recipients",
                topic, outcome.findings, outcome.total_sources, outcome.recipients_emailed
            );
        }
        Command::Content { topic } => {
            let generator = ContentGenerator::new(app.workflow_context()?)?;
            let documents = generator.run(&topic).await?;
            println!("Created {} documents for {:?}", documents.len(), topic);
            for doc in documents {
                println!("  📄 {} {}", doc.title, doc.url);
            }
        }
        Command::Finance { symbols } => {
            let dashboard = FinancialDashboard::new(app.workflow_context()?)?;
            let outcome = dashboard.run(symbols).await?;
            println!(
                "Dashboard updated {}: {} data points, sentiment {}, {} alerts",
                Local::now().format("%Y-%m-%d %H:%M"),
                outcome.data_points,
                outcome.sentiment,
                outcome.alerts
            );
        }
        Command::Help | Command::Models => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match cli::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("\u{001b}[31m{}\u{001b}[0m", e);
            return ExitCode::FAILURE;
        }
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\u{001b}[31mError: {:#}\u{001b}[0m", e);
            ExitCode::FAILURE
        }
    }
}
