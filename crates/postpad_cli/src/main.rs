//! `postpad` command line entry point.
//!
//! # Responsibility
//! - Map user-facing actions onto `postpad_core` services and the composer.
//! - Print the actionable message of a failure once and exit non-zero.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Select};
use log::info;
use postpad_core::migrate::import_legacy_drafts;
use postpad_core::model::todo::TodoId;
use postpad_core::moderation::PostIdeaGenerator;
use postpad_core::repo::account_repo::SqliteAccountRepository;
use postpad_core::repo::draft_repo::SqliteDraftRepository;
use postpad_core::repo::post_repo::SqlitePostRepository;
use postpad_core::repo::streak_repo::SqliteStreakRepository;
use postpad_core::repo::tag_repo::SqliteTagRepository;
use postpad_core::repo::todo_repo::SqliteTodoRepository;
use postpad_core::service::draft_service::DraftService;
use postpad_core::service::stats_service::StatsService;
use postpad_core::service::tag_service::TagService;
use postpad_core::service::todo_service::TodoService;
use postpad_core::{
    init_logging, open_db, AssistClient, AuthService, ComposeError, Composer, ComposerDeps, Config,
    Decision, DraftId, ModerationVerdict, Priority, PublishOutcome, Session, SystemClock, TodoItem,
    TodoStatus, XPublisher,
};
use rusqlite::Connection;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "postpad", version, about = "Compose, moderate and publish short posts")]
struct Cli {
    #[command(flatten)]
    credentials: Credentials,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Credentials {
    #[arg(long, env = "POSTPAD_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "POSTPAD_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account with --email/--password.
    Signup,
    /// Manage saved drafts.
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Moderate and publish text or a saved draft.
    Publish {
        #[arg(required_unless_present = "draft", conflicts_with = "draft")]
        text: Option<String>,
        #[arg(long)]
        draft: Option<DraftId>,
    },
    /// Generate a post suggestion for a topic.
    Idea { topic: String },
    /// Manage the to-do list.
    #[command(subcommand)]
    Todo(TodoCommand),
    /// Manage to-do tags.
    #[command(subcommand)]
    Tag(TagCommand),
    /// Show counters and the current streak.
    Stats,
    /// Import drafts exported from the previous document store.
    ImportDrafts { file: PathBuf },
}

#[derive(Debug, Subcommand)]
enum DraftCommand {
    Save { text: String },
    List,
    Show { id: DraftId },
    /// Print the full content for copying.
    Copy { id: DraftId },
    Delete { id: DraftId },
}

#[derive(Debug, Subcommand)]
enum TodoCommand {
    Add {
        text: String,
        #[arg(long, default_value = "medium", value_parser = parse_priority)]
        priority: Priority,
    },
    List,
    Toggle { id: TodoId },
    Status {
        id: TodoId,
        #[arg(value_parser = parse_status)]
        status: TodoStatus,
    },
    /// Replace the tags of an item; pass no names to clear them.
    Tags { id: TodoId, names: Vec<String> },
    Delete { id: TodoId },
}

#[derive(Debug, Subcommand)]
enum TagCommand {
    Add { name: String },
    List,
    Delete { id: Uuid },
}

fn main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    let cli = Cli::parse();

    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir).context("failed to initialise logging")?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let session = authenticate(&conn, &cli.credentials, matches!(cli.command, Command::Signup))?;
    info!("event=cli_command module=cli status=start user_id={}", session.user_id());

    match cli.command {
        Command::Signup => {
            println!("Account created for {}.", session.email());
            Ok(())
        }
        Command::Draft(command) => run_draft(&conn, &session, command),
        Command::Publish { text, draft } => run_publish(&conn, &config, &session, text, draft),
        Command::Idea { topic } => {
            let client =
                AssistClient::new(config.moderation_url.clone(), config.assist_url.clone());
            let idea = client
                .generate(&topic)
                .map_err(|err| anyhow!("Could not generate an idea: {err}"))?;
            println!("{idea}");
            Ok(())
        }
        Command::Todo(command) => run_todo(&conn, &session, command),
        Command::Tag(command) => run_tag(&conn, &session, command),
        Command::Stats => run_stats(&conn, &config, &session),
        Command::ImportDrafts { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let drafts = SqliteDraftRepository::try_new(&conn, &session)?;
            let report = import_legacy_drafts(&drafts, &session, &json)?;
            println!(
                "Imported {} drafts, skipped {}.",
                report.imported, report.skipped
            );
            Ok(())
        }
    }
}

fn authenticate(conn: &Connection, credentials: &Credentials, sign_up: bool) -> Result<Session> {
    let (Some(email), Some(password)) = (&credentials.email, &credentials.password) else {
        bail!("--email and --password (or POSTPAD_EMAIL and POSTPAD_PASSWORD) are required");
    };
    let auth = AuthService::new(SqliteAccountRepository::try_new(conn)?);
    let session = if sign_up {
        auth.sign_up(email, password, &SystemClock)?
    } else {
        auth.sign_in(email, password)?
    };
    Ok(session)
}

fn run_draft(conn: &Connection, session: &Session, command: DraftCommand) -> Result<()> {
    let drafts = DraftService::new(
        SqliteDraftRepository::try_new(conn, session)?,
        session,
        &SystemClock,
    );
    match command {
        DraftCommand::Save { text } => {
            let draft = drafts.save_draft(&text)?;
            println!("Saved draft {}.", draft.id);
        }
        DraftCommand::List => {
            for draft in drafts.list_drafts()? {
                let marker = if draft.needs_review { " [needs review]" } else { "" };
                println!(
                    "{}  {}  {}{}",
                    draft.id,
                    draft.created_at.format("%Y-%m-%d %H:%M"),
                    draft.preview(),
                    marker
                );
            }
        }
        DraftCommand::Show { id } => {
            let draft = drafts.get_draft(id)?;
            println!("{}\n\n{}", draft.created_at.to_rfc3339(), draft.content);
        }
        DraftCommand::Copy { id } => println!("{}", drafts.copy_draft(id)?),
        DraftCommand::Delete { id } => {
            drafts.delete_draft(id)?;
            println!("Deleted draft {id}.");
        }
    }
    Ok(())
}

fn run_publish(
    conn: &Connection,
    config: &Config,
    session: &Session,
    text: Option<String>,
    draft_id: Option<DraftId>,
) -> Result<()> {
    let drafts = SqliteDraftRepository::try_new(conn, session)?;
    let posts = SqlitePostRepository::try_new(conn, session)?;
    let streaks = SqliteStreakRepository::try_new(conn, session)?;
    let gate = AssistClient::new(config.moderation_url.clone(), config.assist_url.clone());
    let publisher = XPublisher::from_config(config);
    let deps = ComposerDeps {
        drafts: &drafts,
        posts: &posts,
        streaks: &streaks,
        gate: &gate,
        publisher: &publisher,
        clock: &SystemClock,
        zone: config.reference_zone,
        policy: config.moderation_policy,
    };

    let composer = Composer::new(session.clone());
    match (text, draft_id) {
        (_, Some(id)) => {
            let draft = DraftService::new(
                SqliteDraftRepository::try_new(conn, session)?,
                session,
                &SystemClock,
            )
            .get_draft(id)?;
            composer.load_draft(&draft).map_err(user_facing)?;
        }
        (Some(text), None) => composer.set_text(text).map_err(user_facing)?,
        (None, None) => bail!("nothing to publish"),
    }

    let mut outcome = composer.publish(&deps).map_err(user_facing)?;
    loop {
        match outcome {
            PublishOutcome::Published(report) => {
                println!("Posted ({}).", report.post.external_post_id);
                if let Some(streak) = report.streak {
                    println!("Streak: {} day(s).", streak.new_streak);
                }
                for note in report.notes {
                    println!("Note: {note}");
                }
                return Ok(());
            }
            PublishOutcome::NeedsDecision(verdict) => {
                let decision = prompt_decision(&verdict)?;
                outcome = composer.decide(decision, &deps).map_err(user_facing)?;
            }
            PublishOutcome::QueuedForReview(draft) => {
                println!(
                    "Moderation is unavailable; saved as draft {} for review.",
                    draft.id
                );
                return Ok(());
            }
            PublishOutcome::ReturnedToEditing => {
                println!("Not posted. Edit the text and publish again.");
                return Ok(());
            }
        }
    }
}

fn prompt_decision(verdict: &ModerationVerdict) -> Result<Decision> {
    println!("This note may be offensive: {}", verdict.explanation);
    let mut options = vec![
        ("Edit it myself", Decision::EditManually),
        ("Post the original anyway", Decision::PostOriginal),
    ];
    if verdict.has_suggestion() {
        println!("Suggested rewrite: {}", verdict.rephrased_suggestion);
        options.push(("Use the suggested rewrite", Decision::UseSuggestion));
    }

    let labels = options.iter().map(|(label, _)| *label).collect::<Vec<_>>();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("How do you want to continue?")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(options[choice].1)
}

fn run_todo(conn: &Connection, session: &Session, command: TodoCommand) -> Result<()> {
    let tags = SqliteTagRepository::try_new(conn, session)?;
    let todos = TodoService::new(
        SqliteTodoRepository::try_new(conn, session)?,
        &tags,
        session,
        &SystemClock,
    );
    match command {
        TodoCommand::Add { text, priority } => {
            let todo = todos.add_todo(&text, priority)?;
            println!("Added {}.", todo.id);
        }
        TodoCommand::List => {
            for todo in todos.list_todos()? {
                print_todo(&todo);
            }
        }
        TodoCommand::Toggle { id } => print_todo(&todos.toggle_todo(id)?),
        TodoCommand::Status { id, status } => print_todo(&todos.set_status(id, status)?),
        TodoCommand::Tags { id, names } => print_todo(&todos.set_tags(id, names.as_slice())?),
        TodoCommand::Delete { id } => {
            todos.delete_todo(id)?;
            println!("Deleted {id}.");
        }
    }
    Ok(())
}

fn print_todo(todo: &TodoItem) {
    let check = if todo.completed { "x" } else { " " };
    let tags = todo.tags.iter().cloned().collect::<Vec<_>>().join(", ");
    println!(
        "[{check}] {}  {}  ({}, {})  {}",
        todo.id,
        todo.text,
        todo.priority.as_str(),
        todo.status.as_str(),
        tags
    );
}

fn run_tag(conn: &Connection, session: &Session, command: TagCommand) -> Result<()> {
    let tags = TagService::new(SqliteTagRepository::try_new(conn, session)?, session);
    match command {
        TagCommand::Add { name } => {
            let tag = tags.add_tag(&name)?;
            println!("Added tag {} ({}).", tag.name, tag.id);
        }
        TagCommand::List => {
            for tag in tags.list_tags()? {
                println!("{}  {}", tag.id, tag.name);
            }
        }
        TagCommand::Delete { id } => {
            tags.delete_tag(id)?;
            println!("Deleted tag {id}.");
        }
    }
    Ok(())
}

fn run_stats(conn: &Connection, config: &Config, session: &Session) -> Result<()> {
    let drafts = SqliteDraftRepository::try_new(conn, session)?;
    let posts = SqlitePostRepository::try_new(conn, session)?;
    let streaks = SqliteStreakRepository::try_new(conn, session)?;
    let todos = SqliteTodoRepository::try_new(conn, session)?;
    let tags = SqliteTagRepository::try_new(conn, session)?;
    let stats = StatsService {
        drafts: &drafts,
        posts: &posts,
        streaks: &streaks,
        todos: &todos,
        tags: &tags,
        clock: &SystemClock,
        zone: config.reference_zone,
    }
    .fetch_stats()?;

    println!("Drafts:          {}", stats.drafts);
    println!("Published posts: {}", stats.published_posts);
    println!("Current streak:  {}", stats.current_streak);
    println!("Open to-dos:     {}", stats.open_todos);
    println!("Completed to-dos:{}", stats.completed_todos);
    println!("Tags:            {}", stats.tags);
    Ok(())
}

fn user_facing(err: ComposeError) -> anyhow::Error {
    anyhow!(err.user_message())
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| format!("unknown priority `{value}` (low|medium|high)"))
}

fn parse_status(value: &str) -> Result<TodoStatus, String> {
    TodoStatus::parse(value).ok_or_else(|| {
        format!("unknown status `{value}` (no-status|in-progress|needs-review|blocked)")
    })
}
