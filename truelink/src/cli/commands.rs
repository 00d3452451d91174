//! CLI command execution.
//!
//! Each command builds the component it needs, runs one operation and
//! renders the result. A missing or rejected credential is reported as a
//! sign-in prompt rather than a generic failure.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::api::ApiClient;
use crate::auth::AuthFlow;
use crate::config::Config;
use crate::connections::{ConnectionManager, SendOutcome};
use crate::dashboard::{Dashboard, Tab};
use crate::error::{ApiError, ApiResult};
use crate::models::{Decision, ProfessionalProfile, ProfileForm, User, UserSummary};
use crate::profile::ProfileEditor;
use crate::search::DirectorySearch;
use crate::session::{CredentialFile, Session};

use super::args::{Cli, Commands, ProfileAction, ProfileEdit};

/// Everything a command needs, built once per invocation.
struct Invocation {
    config: Config,
    credentials: CredentialFile,
    session: Session,
    client: ApiClient,
}

impl Invocation {
    fn load(cli: &Cli) -> Result<Self> {
        let config = Config::from_env()?
            .with_overrides(cli.api_url.as_deref(), cli.session_file.as_deref());
        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self> {
        let credentials = CredentialFile::new(config.session_file.clone());
        let session = credentials.restore()?;
        let client = ApiClient::new(&config, session.clone()).context("Failed to build HTTP client")?;
        Ok(Self {
            config,
            credentials,
            session,
            client,
        })
    }
}

/// Turn an API failure into a user-facing error for `action` ("view your connections").
fn explain(err: ApiError, action: &str) -> anyhow::Error {
    if err.is_unauthorized() {
        anyhow!("Please log in to {action} (run `truelink login`)")
    } else {
        anyhow::Error::new(err).context(format!("Failed to {action}"))
    }
}

fn short_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let ctx = Invocation::load(&cli)?;

    match cli.command {
        Commands::Login { email, password } => login(&ctx, &email, &password).await,
        Commands::Register {
            email,
            name,
            password,
        } => register(&ctx, &email, &name, &password).await,
        Commands::Logout => logout(&ctx),
        Commands::Status => {
            status(&ctx);
            Ok(())
        }
        Commands::Dashboard => dashboard(&ctx).await,
        Commands::Profile { action } => match action {
            ProfileAction::Show => show_profile(&ctx).await,
            ProfileAction::Edit(edit) => edit_profile(&ctx, edit).await,
        },
        Commands::Search { term } => search(&ctx, &term.join(" ")).await,
        Commands::Connect {
            user_id,
            from_search,
        } => connect(&ctx, &user_id, from_search.as_deref()).await,
        Commands::Requests => list_requests(&ctx).await,
        Commands::Accept { id } => respond(&ctx, &id, Decision::Accepted).await,
        Commands::Reject { id } => respond(&ctx, &id, Decision::Rejected).await,
        Commands::Respond { id, decision } => respond(&ctx, &id, decision).await,
        Commands::Connections => list_connections(&ctx).await,
    }
}

async fn login(ctx: &Invocation, email: &str, password: &str) -> Result<()> {
    let auth = AuthFlow::new(ctx.client.clone());
    let user = auth
        .login(email, password)
        .await
        .map_err(|e| anyhow::Error::new(e).context("Login failed"))?;
    remember(ctx, &user)?;
    print_welcome(&user);
    Ok(())
}

async fn register(ctx: &Invocation, email: &str, full_name: &str, password: &str) -> Result<()> {
    let auth = AuthFlow::new(ctx.client.clone());
    let user = auth
        .register(email, full_name, password)
        .await
        .map_err(|e| anyhow::Error::new(e).context("Registration failed"))?;
    remember(ctx, &user)?;
    print_welcome(&user);
    Ok(())
}

/// Persist the new credential and the account it belongs to.
fn remember(ctx: &Invocation, user: &User) -> Result<()> {
    ctx.credentials.sync(&ctx.session)?;
    ctx.credentials.save_user(user)
}

fn print_welcome(user: &User) {
    println!("Welcome to TrueLink, {}!", user.full_name);
    println!("Signed in as {} ({})", user.email, user.id);
    if !user.email_verified {
        println!("Your email address is not verified yet.");
    }
}

fn logout(ctx: &Invocation) -> Result<()> {
    AuthFlow::new(ctx.client.clone()).logout();
    ctx.credentials.sync(&ctx.session)?;
    println!("Signed out.");
    Ok(())
}

fn status(ctx: &Invocation) {
    println!("API:        {}", ctx.client.base_url());
    println!("Credential: {}", ctx.credentials.path().display());
    if ctx.session.is_authenticated() {
        println!("Status:     signed in");
    } else {
        println!("Status:     signed out (run `truelink login`)");
    }
    tracing::debug!(timeout_secs = ctx.config.timeout.as_secs(), "status reported");
}

async fn dashboard(ctx: &Invocation) -> Result<()> {
    for line in dashboard_lines(ctx).await? {
        println!("{line}");
    }
    Ok(())
}

async fn dashboard_lines(ctx: &Invocation) -> Result<Vec<String>> {
    let dashboard = Dashboard::new(&ctx.client);
    let user = if ctx.session.is_authenticated() {
        ctx.credentials.load_user()?
    } else {
        None
    };
    let overview = dashboard.overview(user.as_ref()).await;

    let mut lines = Vec::new();
    if let Some(greeting) = &overview.greeting {
        lines.push(greeting.clone());
    }
    lines.push("TrueLink dashboard".to_string());
    lines.push("-".repeat(40));
    lines.push(tile("Profile strength", overview.profile_strength.map(|s| format!("{s}% complete")), "view your profile"));
    lines.push(tile("Your network", overview.connection_count.map(|n| format!("{n} connections")), "view your connections"));
    lines.push(tile("Pending requests", overview.pending_count.map(|n| n.to_string()), "view connection requests"));
    if let Some(verified) = overview.email_verified {
        lines.push(format!("{:<18} {}", "Verification", if verified { "verified" } else { "unverified" }));
    }
    Ok(lines)
}

fn tile(label: &str, value: ApiResult<String>, action: &str) -> String {
    match value {
        Ok(v) => format!("{label:<18} {v}"),
        Err(e) if e.is_unauthorized() => format!("{label:<18} Please log in to {action}"),
        Err(e) => format!("{label:<18} error: {e}"),
    }
}

async fn show_profile(ctx: &Invocation) -> Result<()> {
    let editor = ProfileEditor::new(ctx.client.clone());
    let form = editor
        .load_profile()
        .await
        .map_err(|e| explain(e, "view your profile"))?;
    print_profile(&form.to_update());
    Ok(())
}

fn print_profile(profile: &ProfessionalProfile) {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    println!("{:<12} {}", "Headline", show(&profile.headline));
    println!("{:<12} {}", "Position", show(&profile.current_position));
    println!("{:<12} {}", "Company", show(&profile.current_company));
    println!("{:<12} {}", "Location", show(&profile.location));
    println!("{:<12} {}", "Website", show(&profile.website));
    println!("{:<12} {}", "Summary", show(&profile.summary));
    println!();
    println!("Profile strength: {}%", profile.strength());
}

async fn edit_profile(ctx: &Invocation, edit: ProfileEdit) -> Result<()> {
    let editor = ProfileEditor::new(ctx.client.clone());
    let current = editor
        .load_profile()
        .await
        .map_err(|e| explain(e, "edit your profile"))?;

    let form = ProfileForm {
        headline: edit.headline.unwrap_or(current.headline),
        summary: edit.summary.unwrap_or(current.summary),
        location: edit.location.unwrap_or(current.location),
        website: edit.website.unwrap_or(current.website),
        current_position: edit.position.unwrap_or(current.current_position),
        current_company: edit.company.unwrap_or(current.current_company),
    };

    let saved = editor
        .save_profile(&form)
        .await
        .map_err(|e| explain(e, "save your profile"))?;
    println!("Profile saved.");
    println!();
    print_profile(&saved);
    Ok(())
}

async fn search(ctx: &Invocation, term: &str) -> Result<()> {
    let directory = DirectorySearch::new(ctx.client.clone());
    let users = directory
        .search(term)
        .await
        .map_err(|e| explain(e, "search the directory"))?;
    print_users(&users);
    Ok(())
}

fn print_users(users: &[UserSummary]) {
    if users.is_empty() {
        println!("No other professionals found. Try a different search term.");
        return;
    }

    println!("Found {} professional(s)\n", users.len());
    println!("{:<38} {:<24} {:<28} {}", "ID", "NAME", "EMAIL", "HEADLINE");
    println!("{}", "-".repeat(110));
    for user in users {
        println!(
            "{:<38} {:<24} {:<28} {}",
            user.id,
            truncate(&user.full_name, 24),
            truncate(&user.email, 28),
            user.headline.as_deref().unwrap_or("-"),
        );
    }
}

async fn connect(ctx: &Invocation, user_id: &str, from_search: Option<&str>) -> Result<()> {
    let directory = DirectorySearch::new(ctx.client.clone());
    if let Some(term) = from_search {
        directory
            .search(term)
            .await
            .map_err(|e| explain(e, "search the directory"))?;
    }
    let name = directory
        .find(user_id)
        .map_or_else(|| user_id.to_string(), |u| u.full_name);

    let manager = ConnectionManager::new(ctx.client.clone());
    let outcome = manager
        .send_request(user_id, Some(&directory))
        .await
        .map_err(|e| explain(e, "send connection requests"))?;

    match outcome {
        SendOutcome::Sent => println!("Connection request sent to {name}!"),
        SendOutcome::AlreadyRequested { .. } => {
            println!("You've already sent a connection request to {name}");
        }
    }

    if from_search.is_some() {
        println!();
        print_users(&directory.results());
    }
    Ok(())
}

async fn list_requests(ctx: &Invocation) -> Result<()> {
    let manager = ConnectionManager::new(ctx.client.clone());
    let requests = manager
        .list_pending_requests()
        .await
        .map_err(|e| explain(e, "view connection requests"))?;

    println!("Connection Requests ({})", requests.len());
    if requests.is_empty() {
        println!("No pending connection requests.");
        println!("When someone sends you a connection request, it will appear here.");
        return Ok(());
    }

    println!();
    println!("{:<38} {:<24} {:<28} {}", "ID", "FROM", "EMAIL", "SENT");
    println!("{}", "-".repeat(100));
    for request in &requests {
        println!(
            "{:<38} {:<24} {:<28} {}",
            request.id,
            truncate(&request.sender_name, 24),
            truncate(&request.sender_email, 28),
            short_date(&request.created_at),
        );
    }
    Ok(())
}

async fn respond(ctx: &Invocation, request_id: &str, decision: Decision) -> Result<()> {
    let dashboard = Dashboard::new(&ctx.client);
    dashboard
        .select_tab(Tab::Requests)
        .await
        .map_err(|e| explain(e, "view connection requests"))?;

    let action = match decision {
        Decision::Accepted => "accept connection requests",
        Decision::Rejected => "reject connection requests",
    };
    let resolved = dashboard
        .connections
        .resolve_request(request_id, decision)
        .await
        .map_err(|e| explain(e, action))?;

    match decision {
        Decision::Accepted => println!("Connected with {}!", resolved.sender_name),
        Decision::Rejected => {
            println!("Connection request from {} rejected", resolved.sender_name);
        }
    }
    println!("{} pending request(s) left.", dashboard.connections.pending().len());
    Ok(())
}

async fn list_connections(ctx: &Invocation) -> Result<()> {
    let manager = ConnectionManager::new(ctx.client.clone());
    let connections = manager
        .list_connections()
        .await
        .map_err(|e| explain(e, "view your connections"))?;

    println!("Your Professional Network ({})", connections.len());
    if connections.is_empty() {
        println!("No connections yet.");
        println!("Start building your network by searching for professionals and sending connection requests.");
        return Ok(());
    }

    println!();
    println!("{:<4} {:<24} {:<28} {}", "", "NAME", "EMAIL", "CONNECTED SINCE");
    println!("{}", "-".repeat(72));
    for connection in &connections {
        println!(
            "{:<4} {:<24} {:<28} {}",
            connection.initials(),
            truncate(&connection.full_name, 24),
            truncate(&connection.email, 28),
            short_date(&connection.connected_at),
        );
    }
    Ok(())
}
