//! Command-line front end for the donation tracker.
//!
//! Provides subcommands that mirror the screens of the web client:
//! - `login` / `signup` / `logout` / `whoami` - Session management
//! - `activities ...` - Browse and manage fundraising activities
//! - `donate <id> [amount]` - Donate to an activity
//! - `donations mine|all` - Donation history
//! - `admin ...` - Dashboard and user administration
//! - `config check` - Validate configuration file

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::config::{Config, API_URL_ENV};
use crate::donation::{DialogState, SubmitOutcome};
use crate::models::{Activity, ActivityStatus, ResourceId, Role, User};
use crate::navigation::{Navigator, Route};
use crate::validation::{ActivityForm, SignupForm, UserForm};
use crate::views::activity::{ActivityDetail, ActivityList};
use crate::views::admin::{
    DashboardStats, UserDirectory, LOAD_DASHBOARD_FAILED, LOAD_USER_FAILED, UPDATE_USER_FAILED,
};
use crate::views::donations::DonationHistory;
use crate::views::Loadable;
use crate::ClientContext;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "donation-tracker")]
#[command(author, version, about = "Browse fundraising activities and donate", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "DONATION_TRACKER_CONFIG", default_value = "donation-tracker.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Backend URL (overrides the config file and DONATION_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session cookie
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "DONATION_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Page to continue at after logging in (e.g. /activity/<id>)
        #[arg(long)]
        from: Option<String>,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long, env = "DONATION_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the session
    Logout,

    /// Show the current session
    Whoami,

    /// Fundraising activities
    #[command(subcommand)]
    Activities(ActivitiesCommands),

    /// Donate to an activity
    Donate {
        /// Activity ID
        activity: String,
        /// Amount, e.g. 50 or 12.50 (prompted for when omitted)
        amount: Option<String>,
    },

    /// Donation history
    #[command(subcommand)]
    Donations(DonationsCommands),

    /// Administration
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ActivitiesCommands {
    /// List all activities
    List,
    /// List activities you created
    Mine,
    /// Show one activity
    Show { id: String },
    /// Create an activity
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Goal amount
        #[arg(long)]
        goal: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: String,
        #[arg(long)]
        image: Option<String>,
    },
    /// Update an activity; omitted fields keep their current value
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        image: Option<String>,
        /// open or closed
        #[arg(long)]
        status: Option<ActivityStatus>,
        /// Use the administration screen
        #[arg(long)]
        admin: bool,
    },
    /// Delete an activity
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DonationsCommands {
    /// Your donations
    Mine,
    /// Every donation (admin)
    All,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Totals across users, activities and donations
    Dashboard,
    /// User administration
    #[command(subcommand)]
    Users(UsersCommands),
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    List,
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "DONATION_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    /// Update a user; omitted fields keep their current value
    Update {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Load the configuration with environment and command-line overrides
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(&cli.config)?;
    config.apply_overrides(std::env::var(API_URL_ENV).ok(), cli.api_url.clone());
    Ok(config)
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: Config) -> Result<()> {
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(cli, &config);
    }

    config.validate()?;
    let ctx = ClientContext::from_config(config).context("Failed to initialize client")?;

    match &cli.command {
        Commands::Login {
            email,
            password,
            from,
        } => cmd_login(&ctx, email.clone(), password.clone(), from.as_deref()).await,
        Commands::Signup {
            first_name,
            last_name,
            email,
            password,
        } => cmd_signup(&ctx, first_name, last_name, email, password.clone()).await,
        Commands::Logout => cmd_logout(&ctx).await,
        Commands::Whoami => cmd_whoami(&ctx).await,
        Commands::Activities(command) => cmd_activities(&ctx, command).await,
        Commands::Donate { activity, amount } => {
            cmd_donate(&ctx, activity, amount.clone()).await
        }
        Commands::Donations(DonationsCommands::Mine) => cmd_donations(&ctx, false).await,
        Commands::Donations(DonationsCommands::All) => cmd_donations(&ctx, true).await,
        Commands::Admin(AdminCommands::Dashboard) => cmd_dashboard(&ctx).await,
        Commands::Admin(AdminCommands::Users(command)) => cmd_users(&ctx, command).await,
        Commands::Config(ConfigCommands::Check) => Ok(()),
    }
}

/// Apply the route guard; fails with a hint when the page is off limits
async fn enter(ctx: &ClientContext, target: Route) -> Result<Navigator> {
    let mut nav = Navigator::default();
    let landed = nav.navigate(target.clone(), &ctx.session).await;
    if landed == Route::Login {
        bail!(
            "Please log in first: donation-tracker login --from {}",
            target
        );
    }
    if landed != target {
        bail!("Administrator privileges are required for {}", target);
    }
    Ok(nav)
}

fn parse_id(raw: &str) -> Result<ResourceId> {
    Ok(ResourceId::parse(raw.trim())?)
}

fn loaded<T>(loadable: Loadable<T>) -> Result<T> {
    loadable.into_result().map_err(anyhow::Error::msg)
}

/// Mount an activity page and wait for it; Ctrl-C unmounts it
async fn show_detail(ctx: &ClientContext, id: &ResourceId) -> Result<ActivityDetail> {
    let (slot, task) = ActivityDetail::mount(ctx.activities.clone(), id.clone());
    tokio::select! {
        joined = task => {
            joined.context("Activity fetch task failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            bail!("Interrupted");
        }
    }
    loaded(slot.take())
}

// ============================================================================
// Session
// ============================================================================

async fn cmd_login(
    ctx: &ClientContext,
    email: Option<String>,
    password: Option<String>,
    from: Option<&str>,
) -> Result<()> {
    let mut nav = Navigator::new(Route::Login);
    if let Some(from) = from {
        nav.remember(Route::parse(from)?);
    }

    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt("Password")?,
    };

    let state = ctx
        .session
        .login(&email, &password)
        .await
        .map_err(|e| anyhow::Error::msg(e.user_message_or("An error occurred")))?;

    println!("[OK] Logged in as {}", email.trim());
    if state.is_admin {
        println!("     Administrator privileges confirmed");
    }
    let next = nav.after_login();
    println!("     Continue at: {}", next);
    Ok(())
}

async fn cmd_signup(
    ctx: &ClientContext,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let (password, confirm_password) = match password {
        Some(password) => (password.clone(), password),
        None => (prompt("Password")?, prompt("Confirm password")?),
    };
    let form = SignupForm {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        password,
        confirm_password,
    };

    ctx.session
        .signup(form)
        .await
        .map_err(|e| anyhow::Error::msg(e.user_message_or("An error occurred during signup")))?;

    println!("[OK] Account created successfully! Please log in.");
    Ok(())
}

async fn cmd_logout(ctx: &ClientContext) -> Result<()> {
    let result = ctx.session.logout().await;
    let next = Navigator::default().after_logout();

    match result {
        Ok(()) => println!("[OK] Logged out"),
        Err(e) => println!(
            "[!] Local session cleared, but the server could not be notified: {}",
            e
        ),
    }
    println!("     Continue at: {}", next);
    Ok(())
}

async fn cmd_whoami(ctx: &ClientContext) -> Result<()> {
    let state = ctx.session.refresh().await;
    println!();
    println!("Server:         {}", ctx.http.base_url());
    println!(
        "Authenticated:  {}",
        if state.authenticated { "yes" } else { "no" }
    );
    println!("Administrator:  {}", if state.is_admin { "yes" } else { "no" });
    if let Some(path) = ctx.http.cookies().path() {
        println!("Cookie file:    {}", path.display());
    }
    println!();
    Ok(())
}

// ============================================================================
// Activities
// ============================================================================

async fn cmd_activities(ctx: &ClientContext, command: &ActivitiesCommands) -> Result<()> {
    match command {
        ActivitiesCommands::List => {
            enter(ctx, Route::Activities).await?;
            let list = loaded(ActivityList::load_all(&ctx.activities).await)?;
            print_activities(&list.activities);
            Ok(())
        }
        ActivitiesCommands::Mine => {
            enter(ctx, Route::MyActivities).await?;
            let list = loaded(ActivityList::load_mine(&ctx.activities).await)?;
            print_activities(&list.activities);
            Ok(())
        }
        ActivitiesCommands::Show { id } => {
            let id = parse_id(id)?;
            enter(ctx, Route::Activity(id.clone())).await?;
            let detail = show_detail(ctx, &id).await?;
            print_activity(detail.activity());
            Ok(())
        }
        ActivitiesCommands::Create {
            name,
            description,
            goal,
            end_date,
            image,
        } => {
            enter(ctx, Route::CreateActivity).await?;
            let form = ActivityForm {
                name: name.clone(),
                description: description.clone(),
                goal_amount: goal.clone(),
                end_date: end_date.clone(),
                image: image.clone().unwrap_or_default(),
                status: None,
            };
            let new_activity = form.into_new_activity(Local::now().date_naive())?;
            let created = ctx.activities.create(&new_activity).await.map_err(|e| {
                anyhow::Error::msg(e.user_message_or("Failed to create activity. Please try again."))
            })?;
            println!("[OK] Activity created");
            println!("     Continue at: {}", Route::Activity(created.id.clone()));
            print_activity(&created);
            Ok(())
        }
        ActivitiesCommands::Update {
            id,
            name,
            description,
            goal,
            end_date,
            image,
            status,
            admin,
        } => {
            let id = parse_id(id)?;
            enter(ctx, ActivityList::edit_route(&id, *admin)).await?;

            let current = show_detail(ctx, &id).await?;
            let current = current.activity();
            let form = ActivityForm {
                name: name.clone().unwrap_or_else(|| current.name.clone()),
                description: description
                    .clone()
                    .unwrap_or_else(|| current.description.clone()),
                goal_amount: goal.clone().unwrap_or_else(|| current.goal_amount.to_string()),
                end_date: end_date.clone().unwrap_or_else(|| {
                    current
                        .end_at
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default()
                }),
                image: image
                    .clone()
                    .or_else(|| current.image.clone())
                    .unwrap_or_default(),
                status: Some(status.unwrap_or(current.status)),
            };
            let update = form.into_update(Local::now().date_naive())?;
            let saved = ctx.activities.update(&id, &update).await.map_err(|e| {
                anyhow::Error::msg(e.user_message_or("Failed to update activity. Please try again."))
            })?;
            println!("[OK] Activity updated");
            print_activity(&saved);
            Ok(())
        }
        ActivitiesCommands::Delete { id, yes } => {
            let id = parse_id(id)?;
            enter(ctx, Route::MyActivities).await?;
            if !*yes && !confirm("Are you sure you want to delete this activity?")? {
                println!("Cancelled.");
                return Ok(());
            }

            let mut list = ActivityList::default();
            list.delete(&ctx.activities, &id)
                .await
                .map_err(|e| anyhow::Error::msg(ActivityList::delete_error_message(&e)))?;
            println!("[OK] Activity deleted");
            Ok(())
        }
    }
}

fn print_activities(activities: &[Activity]) {
    if activities.is_empty() {
        println!("No activities found.");
        return;
    }

    println!();
    println!(
        "{:<26}  {:<28}  {:<8}  {:>12}  {:>12}  {:>8}  {:<20}",
        "ID", "NAME", "STATUS", "RAISED", "GOAL", "PROGRESS", "CREATOR"
    );
    println!("{}", "-".repeat(128));

    for activity in activities {
        println!(
            "{:<26}  {:<28}  {:<8}  {:>12}  {:>12}  {:>8}  {:<20}",
            activity.id,
            truncate(&activity.name, 28),
            activity.status,
            activity.total_donations,
            activity.goal_amount,
            activity.progress_label(),
            truncate(&activity.creator_name(), 20)
        );
    }
    println!();
}

fn print_activity(activity: &Activity) {
    println!();
    println!("=== {} ===", activity.name);
    println!();
    println!("ID:           {}", activity.id);
    println!("Status:       {}", activity.status);
    println!("Created by:   {}", activity.creator_name());
    println!(
        "Raised:       {} of {} ({})",
        activity.total_donations,
        activity.goal_amount,
        activity.progress_label()
    );
    println!("              {}", progress_bar(activity.progress_bar_percent(), 40));
    if let Some(end_at) = activity.end_at {
        println!("Ends:         {}", format_date(end_at));
    }
    if let Some(image) = &activity.image {
        println!("Image:        {}", image);
    }
    if !activity.description.is_empty() {
        println!();
        println!("{}", activity.description);
    }
    println!();
}

// ============================================================================
// Donations
// ============================================================================

async fn cmd_donate(ctx: &ClientContext, activity: &str, amount: Option<String>) -> Result<()> {
    let id = parse_id(activity)?;
    let mut nav = enter(ctx, Route::Activity(id.clone())).await?;
    let mut detail = show_detail(ctx, &id).await?;

    if !detail.open_donation(ctx.session.snapshot(), &mut nav) {
        bail!(
            "Please log in to donate: donation-tracker login --from {}",
            nav.return_to().cloned().unwrap_or(Route::Activity(id))
        );
    }

    let amount = match amount {
        Some(amount) => amount,
        None => prompt(&format!("Amount to donate to '{}'", detail.activity().name))?,
    };

    let flow = ctx.donation_flow();
    match detail.donate(&flow, &amount).await {
        SubmitOutcome::Donated { .. } => {
            if let Some(notice) = detail.dialog.take_notice() {
                println!("[OK] {}", notice);
            }
            let activity = detail.activity();
            println!(
                "     {} raised of {} ({})",
                activity.total_donations,
                activity.goal_amount,
                activity.progress_label()
            );
            Ok(())
        }
        SubmitOutcome::Rejected(message) => bail!(message),
        SubmitOutcome::Failed(_) | SubmitOutcome::Ignored => match detail.dialog.state() {
            DialogState::Error(message) => bail!(message.clone()),
            _ => bail!(crate::donation::SUBMIT_FAILED_MESSAGE),
        },
    }
}

async fn cmd_donations(ctx: &ClientContext, all: bool) -> Result<()> {
    let history = if all {
        enter(ctx, Route::Admin).await?;
        loaded(DonationHistory::load_all(&ctx.donations).await)?
    } else {
        enter(ctx, Route::MyDonations).await?;
        loaded(DonationHistory::load_mine(&ctx.donations).await)?
    };

    if history.donations.is_empty() {
        println!("No donations found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<26}  {:<30}  {:<22}  {:>10}  {:<12}",
        "ID", "ACTIVITY", "DONOR", "AMOUNT", "DATE"
    );
    println!("{}", "-".repeat(108));
    for donation in &history.donations {
        println!(
            "{:<26}  {:<30}  {:<22}  {:>10}  {:<12}",
            donation.id,
            truncate(&donation.activity_name(), 30),
            truncate(&donation.donor_name(), 22),
            format!("{:.2}", donation.amount.as_f64()),
            donation
                .created_at()
                .map(format_date)
                .unwrap_or_else(|| "-".to_string())
        );
    }
    println!();
    println!("Total Donated: {} ({})", history.total_label(), history.count_label());
    println!();
    Ok(())
}

// ============================================================================
// Administration
// ============================================================================

async fn cmd_dashboard(ctx: &ClientContext) -> Result<()> {
    enter(ctx, Route::Admin).await?;
    let stats = DashboardStats::load(&ctx.users, &ctx.activities, &ctx.donations)
        .await
        .map_err(|e| anyhow::Error::msg(e.user_message_or(LOAD_DASHBOARD_FAILED)))?;

    println!();
    println!("=== Dashboard ===");
    println!();
    println!("Users:        {}", stats.users);
    println!(
        "Activities:   {} ({} active, {} closed)",
        stats.activities, stats.open, stats.closed
    );
    println!("Donations:    {}", stats.donations);
    println!("Total amount: {:.2}", stats.amount.as_f64());
    println!();
    Ok(())
}

async fn cmd_users(ctx: &ClientContext, command: &UsersCommands) -> Result<()> {
    enter(ctx, Route::Admin).await?;

    match command {
        UsersCommands::List => {
            let directory = loaded(UserDirectory::load(&ctx.users).await)?;
            print_users(&directory.users);
            Ok(())
        }
        UsersCommands::Show { id } => {
            let id = parse_id(id)?;
            let user = ctx
                .users
                .get(&id)
                .await
                .map_err(|e| anyhow::Error::msg(e.user_message_or(LOAD_USER_FAILED)))?;
            print_user(&user);
            Ok(())
        }
        UsersCommands::Create {
            first_name,
            last_name,
            email,
            password,
            role,
        } => {
            let (password, confirm_password) = match password {
                Some(password) => (password.clone(), password.clone()),
                None => (prompt("Password")?, prompt("Confirm password")?),
            };
            let new_user = SignupForm {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: email.clone(),
                password,
                confirm_password,
            }
            .into_new_user(*role)?;

            let mut directory = UserDirectory::default();
            let created = directory
                .create(&ctx.users, &new_user)
                .await
                .map_err(|e| anyhow::Error::msg(e.user_message_or("Failed to create user")))?;
            println!("[OK] User created");
            print_user(&created);
            Ok(())
        }
        UsersCommands::Update {
            id,
            first_name,
            last_name,
            email,
            role,
        } => {
            let id = parse_id(id)?;
            enter(ctx, Route::AdminEditUser(id.clone())).await?;
            let current = ctx
                .users
                .get(&id)
                .await
                .map_err(|e| anyhow::Error::msg(e.user_message_or(LOAD_USER_FAILED)))?;
            let form = UserForm {
                first_name: first_name.clone().unwrap_or(current.first_name.clone()),
                last_name: last_name.clone().unwrap_or(current.last_name.clone()),
                email: email.clone().unwrap_or(current.email.clone()),
                role: role.unwrap_or(current.role),
            };

            let mut directory = UserDirectory {
                users: vec![current],
            };
            let saved = directory
                .update(&ctx.users, &id, form)
                .await
                .map_err(|e| anyhow::Error::msg(e.user_message_or(UPDATE_USER_FAILED)))?;
            println!("[OK] User updated");
            print_user(&saved);
            Ok(())
        }
        UsersCommands::Delete { id, yes } => {
            let id = parse_id(id)?;
            let mut directory = loaded(UserDirectory::load(&ctx.users).await)?;
            let name = directory
                .find(&id)
                .map(User::full_name)
                .unwrap_or_else(|| id.to_string());
            if !*yes && !confirm(&format!("Are you sure you want to delete user: {}?", name))? {
                println!("Cancelled.");
                return Ok(());
            }

            directory.delete(&ctx.users, &id).await.map_err(|e| {
                anyhow::Error::msg(
                    e.user_message_or(crate::views::admin::DELETE_USER_FAILED),
                )
            })?;
            println!("[OK] User deleted successfully");
            Ok(())
        }
    }
}

fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }

    println!();
    println!("{:<26}  {:<28}  {:<32}  {:<6}", "ID", "NAME", "EMAIL", "ROLE");
    println!("{}", "-".repeat(98));
    for user in users {
        println!(
            "{:<26}  {:<28}  {:<32}  {:<6}",
            user.id,
            truncate(&user.full_name(), 28),
            truncate(&user.email, 32),
            user.role.label()
        );
    }
    println!();
}

fn print_user(user: &User) {
    println!();
    println!("ID:      {}", user.id);
    println!("Name:    {}", user.full_name());
    println!("Email:   {}", user.email);
    println!("Role:    {}", user.role.label());
    println!();
}

// ============================================================================
// Configuration
// ============================================================================

fn cmd_config_check(cli: &Cli, config: &Config) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!("     Defaults (plus environment overrides) are in effect.");
        println!();
    }

    match config.validate() {
        Ok(()) => {
            println!("[OK] Configuration is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Base URL:     {}", config.api.base_url);
            println!("  Timeout:      {}s", config.api.timeout_secs);
            println!();
            println!("Session:");
            println!("  Cookie:       {}", config.session.cookie_name);
            println!("  Cookie File:  {}", config.session.cookie_path().display());
            println!();
            println!("Donations:");
            println!("  Reconcile:    {}", config.donation.reconcile);
            println!();
            println!("Logging:");
            println!("  Level:        {}", config.logging.level);
            println!();

            if config.api.base_url.starts_with("http://")
                && !config.api.base_url.contains("localhost")
                && !config.api.base_url.contains("127.0.0.1")
            {
                println!("Warnings:");
                println!("  [!] The API is reached over plain HTTP; the session token is sent unencrypted");
                println!();
            }
            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration is invalid!");
            println!();
            println!("Error: {}", e);
            println!();
            bail!("Invalid configuration");
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{} [y/N]", question))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Text progress bar, `percent` already clamped to 0..=100
fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long activity name", 10), "a very ...");
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(25.0, 8), "[##......]");
        assert_eq!(progress_bar(100.0, 4), "[####]");
        assert_eq!(progress_bar(0.0, 3), "[...]");
    }

    #[test]
    fn test_cli_parses_donate() {
        let cli = Cli::try_parse_from(["donation-tracker", "donate", "a1", "12.50"]).unwrap();
        match cli.command {
            Commands::Donate { activity, amount } => {
                assert_eq!(activity, "a1");
                assert_eq!(amount.as_deref(), Some("12.50"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_nested_admin_commands() {
        let cli = Cli::try_parse_from([
            "donation-tracker",
            "--api-url",
            "http://backend.test",
            "admin",
            "users",
            "update",
            "u1",
            "--role",
            "admin",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://backend.test"));
        assert!(matches!(
            cli.command,
            Commands::Admin(AdminCommands::Users(UsersCommands::Update {
                role: Some(Role::Admin),
                ..
            }))
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_status() {
        assert!(Cli::try_parse_from([
            "donation-tracker",
            "activities",
            "update",
            "a1",
            "--status",
            "paused"
        ])
        .is_err());
    }
}
