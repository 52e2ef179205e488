//! CLI module for the training-needs portal.
//!
//! Every command drives the same views the web client offers:
//! - `login` / `logout` / `whoami` / `register` / `password` - account flows
//! - `profile` - show and edit the signed-in profile
//! - `surveys` - answer assigned surveys, manage responses, author surveys
//! - `training` - submit, edit and review training requests
//! - `mapping` - employee-to-manager mapping for admins and HODs
//! - `dashboard` - the role's tabs and its default panel

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::access::{guard, review_stage, Redirect, Role, Route};
use crate::api::{TrainingRequest, User};
use crate::auth::{self, RegisterForm};
use crate::config::Config;
use crate::error::FieldErrors;
use crate::dashboard::{Dashboard, EmployeeHome, Tab, TeamPanel};
use crate::mapping::MappingEditor;
use crate::profile::ProfileView;
use crate::session::{Session, SessionStore};
use crate::survey::{
    AssignedSurveys, AssigneePicker, CreatedSurveys, FillMode, MyResponses, SurveyDraft,
    SurveyFill,
};
use crate::training::{
    AdminFilter, AdminTrainingView, Decision, MyRequests, ReviewQueue, TrainingForm,
    TrainingStatus, FIELDS,
};
use crate::Portal;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "tna")]
#[command(author, version, about = "Training-needs analysis portal client", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "tna.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Backend API URL (overrides `api.base_url`)
    #[arg(long, env = "TNA_API_URL")]
    pub api_url: Option<String>,

    /// Login token to use instead of the saved session
    #[arg(long, env = "TNA_TOKEN")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and save the session
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Forget the saved session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Create an account
    Register(RegisterArgs),

    /// Password recovery
    #[command(subcommand)]
    Password(PasswordCommands),

    /// Profile commands
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Survey commands
    #[command(subcommand)]
    Surveys(SurveyCommands),

    /// Training request commands
    #[command(subcommand)]
    Training(TrainingCommands),

    /// Employee-to-manager mapping
    #[command(subcommand)]
    Mapping(MappingCommands),

    /// Show the dashboard tabs and one panel
    Dashboard {
        /// Tab to open (defaults to the role's default tab)
        #[arg(short, long)]
        tab: Option<Tab>,
    },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub confirm_password: String,
    #[arg(long, default_value = "employee")]
    pub role: Role,
    #[arg(long)]
    pub department: String,
    #[arg(long)]
    pub location: String,
    /// Optional avatar image
    #[arg(long)]
    pub image: Option<PathBuf>,
}

/// Password subcommands
#[derive(Subcommand, Debug)]
pub enum PasswordCommands {
    /// Email a reset link
    Forgot { email: String },
    /// Set a new password with the token from the reset link
    Reset {
        token: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
}

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    Show,
    /// Change profile fields; omitted fields keep their value
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Upload a new avatar image
    Avatar { path: PathBuf },
}

/// Survey subcommands
#[derive(Subcommand, Debug)]
pub enum SurveyCommands {
    /// Surveys assigned to you
    List,
    /// Answer a survey, one `--answer` per question in order
    Fill {
        id: String,
        #[arg(short, long = "answer")]
        answers: Vec<String>,
        /// Edit the existing response
        #[arg(long)]
        edit: bool,
    },
    /// Your submitted responses
    Responses,
    /// Question/answer pairs of one response
    ShowResponse { survey_id: String },
    DeleteResponse { survey_id: String },
    /// Create and assign a survey (admin)
    Create {
        #[arg(long)]
        title: String,
        #[arg(short, long = "question", required = true)]
        questions: Vec<String>,
        /// User id to assign; repeat for more
        #[arg(short, long = "assign")]
        assignees: Vec<String>,
    },
    /// Surveys you created (admin)
    Created {
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// Training subcommands
#[derive(Subcommand, Debug)]
pub enum TrainingCommands {
    /// Submit a new request; answers as `--set field=value`
    Submit {
        #[arg(short, long = "set", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Your own requests
    List(SearchArgs),
    /// Details of one request
    Show { id: String },
    /// Change answers of one of your requests
    Edit {
        id: String,
        #[arg(short, long = "set", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    Delete { id: String },
    /// Requests waiting on your review stage
    Queue(SearchArgs),
    /// Approve or reject a request in your review stage
    Decide { id: String, decision: Decision },
    /// Every request (admin)
    All {
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Find one request by id (admin)
    Lookup { id: String },
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Match request number or requester name
    #[arg(short, long)]
    pub search: Option<String>,
    /// Exact status, e.g. Pending_Manager
    #[arg(long)]
    pub status: Option<String>,
}

/// Mapping subcommands
#[derive(Subcommand, Debug)]
pub enum MappingCommands {
    /// Managers and employees, optionally with one manager's team
    List {
        #[arg(short, long)]
        department: Option<String>,
        #[arg(short, long)]
        manager: Option<String>,
    },
    /// Assign an employee to a manager
    Map {
        employee: String,
        #[arg(short, long)]
        manager: String,
    },
    /// Remove an employee from a manager
    Unmap {
        employee: String,
        #[arg(short, long)]
        manager: String,
    },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected field=value, got `{}`", s))
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

/// Run a CLI command
pub async fn run_command(cli: &Cli, mut config: Config) -> Result<()> {
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    let store = SessionStore::new(config.session.path.clone());
    let session = match &cli.token {
        Some(token) => Some(Session::from_token(token).context("Invalid --token")?),
        None => store.load().context("Failed to read saved session")?,
    };
    let mut portal = Portal::new(config, session).context("Failed to create API client")?;

    let result = dispatch(cli, &mut portal, &store).await;
    print_notifications(&portal);
    result
}

async fn dispatch(cli: &Cli, portal: &mut Portal, store: &SessionStore) -> Result<()> {
    match &cli.command {
        Commands::Login { email, password } => {
            let redirect = auth::login(portal, store, email, password).await?;
            print_redirect(&redirect);
            Ok(())
        }
        Commands::Logout => {
            let redirect = auth::logout(portal, store)?;
            println!("Signed out.");
            print_redirect(&redirect);
            Ok(())
        }
        Commands::Whoami => cmd_whoami(portal).await,
        Commands::Register(args) => cmd_register(portal, args).await,
        Commands::Password(PasswordCommands::Forgot { email }) => {
            let message = auth::forgot_password(portal, email).await?;
            println!("{}", message);
            Ok(())
        }
        Commands::Password(PasswordCommands::Reset {
            token,
            password,
            confirm,
        }) => {
            let redirect = auth::reset_password(portal, token, password, confirm).await?;
            print_redirect(&redirect);
            Ok(())
        }
        Commands::Profile(cmd) => cmd_profile(portal, cmd).await,
        Commands::Surveys(cmd) => cmd_surveys(portal, cmd).await,
        Commands::Training(cmd) => cmd_training(portal, cmd).await,
        Commands::Mapping(cmd) => cmd_mapping(portal, cmd).await,
        Commands::Dashboard { tab } => cmd_dashboard(portal, *tab).await,
    }
}

/// Apply the route guard the web client would apply before showing `route`
fn enter(portal: &Portal, route: Route) -> Result<()> {
    match guard(&route, portal.session()) {
        Ok(()) => Ok(()),
        Err(Route::Login) => anyhow::bail!("Not signed in. Run `tna login` first."),
        Err(landing) => anyhow::bail!(
            "{} is not available to your role (your home is {})",
            route,
            landing
        ),
    }
}

async fn cmd_whoami(portal: &Portal) -> Result<()> {
    let session = portal
        .session()
        .context("Not signed in. Run `tna login` first.")?;
    println!("Name:        {}", session.display_name());
    println!(
        "Role:        {}",
        session.role.map(|r| r.label()).unwrap_or("unknown")
    );
    println!("Department:  {}", or_dash(&session.department));

    let mut profile = ProfileView::new();
    if profile.load(portal).await.is_ok() {
        if let Some(user) = profile.user() {
            println!("Email:       {}", or_dash(&user.email));
            println!("Location:    {}", or_dash(&user.location));
        }
    }
    Ok(())
}

async fn cmd_register(portal: &Portal, args: &RegisterArgs) -> Result<()> {
    let form = RegisterForm {
        name: args.name.clone(),
        email: args.email.clone(),
        password: args.password.clone(),
        confirm_password: args.confirm_password.clone(),
        role: args.role,
        department: args.department.clone(),
        location: args.location.clone(),
        image: args.image.clone(),
    };
    if let Some(strength) = form.strength() {
        println!("Password strength: {}", strength.label());
    }
    let redirect = form.submit(portal).await?;
    print_redirect(&redirect);
    Ok(())
}

async fn cmd_profile(portal: &Portal, cmd: &ProfileCommands) -> Result<()> {
    enter(portal, Route::Profile)?;
    let mut view = ProfileView::new();
    view.load(portal).await?;

    match cmd {
        ProfileCommands::Show => {}
        ProfileCommands::Update {
            name,
            department,
            location,
            email,
        } => {
            let form = &mut view.form;
            for (slot, value) in [
                (&mut form.name, name),
                (&mut form.department, department),
                (&mut form.location, location),
                (&mut form.email, email),
            ] {
                if let Some(value) = value {
                    *slot = value.clone();
                }
            }
            view.save(portal).await?;
        }
        ProfileCommands::Avatar { path } => {
            view.upload_avatar(portal, path).await?;
        }
    }

    let user = view.user().context("Profile not loaded")?;
    println!();
    println!("Name:        {}", user.name);
    println!("Email:       {}", user.email);
    println!("Department:  {}", or_dash(&user.department));
    println!("Location:    {}", or_dash(&user.location));
    println!(
        "Role:        {}",
        user.role.map(|r| r.label()).unwrap_or("unknown")
    );
    if let Some(url) = view.avatar_url(portal) {
        println!("Avatar:      {}", url);
    }
    println!("Back:        {}", view.back_route(portal));
    println!();
    Ok(())
}

async fn cmd_surveys(portal: &Portal, cmd: &SurveyCommands) -> Result<()> {
    match cmd {
        SurveyCommands::List => {
            enter(portal, Route::Feedback)?;
            let mut assigned = AssignedSurveys::new();
            assigned.load(portal).await;
            if let Some(error) = assigned.state().error() {
                anyhow::bail!("{}", error);
            }
            assigned.open_feedback(portal)?;
            println!();
            println!("{:<26}  {:<40}  {:<10}", "ID", "TITLE", "STATUS");
            println!("{}", "-".repeat(80));
            for survey in assigned.surveys() {
                println!(
                    "{:<26}  {:<40}  {:<10}",
                    survey.id,
                    truncate(&survey.title, 40),
                    survey.status
                );
            }
            println!();
            println!("{} pending", assigned.pending_count());
            Ok(())
        }
        SurveyCommands::Fill { id, answers, edit } => {
            let mode = if *edit { FillMode::Edit } else { FillMode::Create };
            enter(
                portal,
                Route::Survey {
                    id: id.clone(),
                    edit: mode.is_edit(),
                },
            )?;
            let mut fill = SurveyFill::load(portal, id, mode).await?;
            if fill.is_submitted() {
                println!("You have already completed \"{}\".", fill.title());
                return Ok(());
            }
            for (i, answer) in answers.iter().enumerate() {
                fill.set_answer(i, answer)?;
            }
            println!("{}", fill.title());
            for (question, answer) in fill.questions().iter().zip(fill.answers()) {
                println!("  {}: {}", question, or_dash(answer));
            }
            let redirect = fill.submit(portal).await;
            for (number, text) in question_errors(fill.errors()) {
                println!("  question {}: {}", number, text);
            }
            print_redirect(&redirect?);
            Ok(())
        }
        SurveyCommands::Responses => {
            enter(portal, Route::MyFeedbackResponses)?;
            let responses = load_responses(portal).await?;
            if responses.responses().is_empty() {
                println!("No responses yet.");
                return Ok(());
            }
            println!();
            println!("{:<26}  {:<40}  {:<20}", "SURVEY", "TITLE", "SUBMITTED");
            println!("{}", "-".repeat(90));
            for response in responses.responses() {
                let submitted = response
                    .submitted_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<26}  {:<40}  {:<20}",
                    response.survey_id,
                    truncate(&response.title, 40),
                    submitted
                );
            }
            println!();
            Ok(())
        }
        SurveyCommands::ShowResponse { survey_id } => {
            enter(portal, Route::MyFeedbackResponses)?;
            let responses = load_responses(portal).await?;
            for (question, answer) in responses.view(survey_id)? {
                println!("Q: {}", question);
                println!("A: {}", answer);
                println!();
            }
            println!("Edit with: {}", responses.edit_route(survey_id)?);
            Ok(())
        }
        SurveyCommands::DeleteResponse { survey_id } => {
            enter(portal, Route::MyFeedbackResponses)?;
            let mut responses = load_responses(portal).await?;
            responses.delete(portal, survey_id).await?;
            Ok(())
        }
        SurveyCommands::Create {
            title,
            questions,
            assignees,
        } => {
            enter(portal, Route::Admin)?;
            let mut picker = AssigneePicker::new();
            picker.load(portal).await?;
            let known: Vec<&User> = picker.users().iter().collect();

            let mut draft = SurveyDraft::new();
            draft.title = title.clone();
            for (i, question) in questions.iter().enumerate() {
                if i > 0 {
                    draft.add_question();
                }
                draft.update_question(i, question);
            }
            for id in assignees {
                if !known.iter().any(|u| &u.id == id) {
                    anyhow::bail!("Unknown or non-assignable user: {}", id);
                }
                draft.toggle_assignee(id);
            }
            draft.create(portal).await?;
            Ok(())
        }
        SurveyCommands::Created { search } => {
            enter(portal, Route::Admin)?;
            let mut created = CreatedSurveys::new();
            if let Some(search) = search {
                created.search = search.clone();
            }
            created.load(portal).await;
            if let Some(error) = created.state().error() {
                anyhow::bail!("{}", error);
            }
            println!();
            println!(
                "{:<26}  {:<40}  {:>8}  {:>9}",
                "ID", "TITLE", "ASSIGNED", "RESPONSES"
            );
            println!("{}", "-".repeat(90));
            for survey in created.visible() {
                println!(
                    "{:<26}  {:<40}  {:>8}  {:>9}",
                    survey.id,
                    truncate(&survey.title, 40),
                    survey.assigned_to.len(),
                    survey.response_count
                );
            }
            println!();
            Ok(())
        }
    }
}

async fn load_responses(portal: &Portal) -> Result<MyResponses> {
    let mut responses = MyResponses::new();
    responses.load(portal).await;
    if let Some(error) = responses.state().error() {
        anyhow::bail!("{}", error);
    }
    Ok(responses)
}

/// Per-question errors in question order, numbered from 1
fn question_errors(errors: &FieldErrors) -> Vec<(String, &str)> {
    let mut fields: Vec<&str> = errors.fields().collect();
    fields.sort_by_key(|field| (field.parse::<usize>().unwrap_or(usize::MAX), *field));
    fields
        .into_iter()
        .filter_map(|field| errors.get(field).map(|text| (field_number(field), text)))
        .collect()
}

fn field_number(field: &str) -> String {
    field
        .parse::<usize>()
        .map(|i| (i + 1).to_string())
        .unwrap_or_else(|_| field.to_string())
}

async fn cmd_training(portal: &Portal, cmd: &TrainingCommands) -> Result<()> {
    match cmd {
        TrainingCommands::Submit { fields } => {
            enter(portal, Route::TrainingRequest)?;
            let mut form = TrainingForm::new();
            for (name, value) in fields {
                form.set(name, value)
                    .with_context(|| format!("Invalid answer for {}", name))?;
            }
            let redirect = form.submit(portal).await?;
            print_redirect(&redirect);
            Ok(())
        }
        TrainingCommands::List(search) => {
            enter(portal, Route::MyTrainingRequests)?;
            let mut mine = MyRequests::new();
            mine.load(portal).await?;
            apply_search(&mut mine.filter, search);
            print_requests(&mine.visible());
            Ok(())
        }
        TrainingCommands::Show { id } => {
            let request = portal.api().training_request(id).await?;
            print_request(&request);
            Ok(())
        }
        TrainingCommands::Edit { id, fields } => {
            enter(portal, Route::TrainingForm(id.clone()))?;
            let mut mine = MyRequests::new();
            mine.load(portal).await?;
            mine.edit_route(portal, id)?;
            let mut form = TrainingForm::load_for_edit(portal, id).await?;
            for (name, value) in fields {
                form.set(name, value)
                    .with_context(|| format!("Invalid answer for {}", name))?;
            }
            let redirect = form.submit(portal).await?;
            print_redirect(&redirect);
            Ok(())
        }
        TrainingCommands::Delete { id } => {
            enter(portal, Route::MyTrainingRequests)?;
            let mut mine = MyRequests::new();
            mine.load(portal).await?;
            mine.delete(portal, id).await?;
            Ok(())
        }
        TrainingCommands::Queue(search) => {
            let mut queue = review_queue(portal)?;
            queue.load(portal).await?;
            apply_search(&mut queue.filter, search);
            println!("{} review queue", queue.stage().label());
            print_requests(&queue.visible());
            Ok(())
        }
        TrainingCommands::Decide { id, decision } => {
            if portal.role() == Some(Role::Admin) {
                let mut view = AdminTrainingView::new();
                view.load(portal).await?;
                view.decide(portal, id, *decision).await?;
            } else {
                let mut queue = review_queue(portal)?;
                queue.load(portal).await?;
                queue.decide(portal, id, *decision).await?;
            }
            Ok(())
        }
        TrainingCommands::All {
            department,
            name,
            email,
            location,
        } => {
            enter(portal, Route::Admin)?;
            let mut view = AdminTrainingView::new();
            view.load(portal).await?;
            view.set_filter(AdminFilter {
                department: department.clone().unwrap_or_default(),
                name: name.clone().unwrap_or_default(),
                email: email.clone().unwrap_or_default(),
                location: location.clone().unwrap_or_default(),
            });
            println!("Departments: {}", view.departments().join(", "));
            print_requests(&view.visible());
            Ok(())
        }
        TrainingCommands::Lookup { id } => {
            enter(portal, Route::Admin)?;
            let mut view = AdminTrainingView::new();
            view.lookup(portal, id).await?;
            if let Some(request) = view.lookup_result() {
                print_request(request);
            }
            Ok(())
        }
    }
}

/// Review queue of the signed-in role
fn review_queue(portal: &Portal) -> Result<ReviewQueue> {
    let role = portal
        .role()
        .context("Not signed in. Run `tna login` first.")?;
    let stage = review_stage(role)
        .with_context(|| format!("{} accounts have no review queue", role.label()))?;
    enter(portal, role.landing_route())?;
    Ok(ReviewQueue::new(stage))
}

fn apply_search(filter: &mut crate::training::RequestFilter, search: &SearchArgs) {
    if let Some(term) = &search.search {
        filter.term = term.clone();
    }
    filter.status = search.status.as_deref().map(TrainingStatus::parse);
}

async fn cmd_mapping(portal: &Portal, cmd: &MappingCommands) -> Result<()> {
    let mut editor = MappingEditor::for_portal(portal)?;
    editor.load(portal).await?;

    match cmd {
        MappingCommands::List {
            department,
            manager,
        } => {
            if let Some(department) = department {
                editor.select_department(department);
            }
            if let Some(manager) = manager {
                editor.select_manager(portal, manager).await?;
            }
            println!("Departments: {}", editor.departments().join(", "));
            print_users("Managers", &editor.managers());
            print_users("Employees", &editor.employees());
            if let Some(manager) = editor.selected_manager() {
                println!();
                println!("Mapped to {}:", manager);
                for employee in editor.mapped_employees() {
                    println!("  {:<26}  {}", employee.id, employee.name);
                }
            }
            Ok(())
        }
        MappingCommands::Map { employee, manager } => {
            editor.select_manager(portal, manager).await?;
            editor.map(portal, employee).await?;
            Ok(())
        }
        MappingCommands::Unmap { employee, manager } => {
            editor.select_manager(portal, manager).await?;
            editor.unmap(portal, employee).await?;
            Ok(())
        }
    }
}

async fn cmd_dashboard(portal: &Portal, tab: Option<Tab>) -> Result<()> {
    let session = portal
        .session()
        .context("Not signed in. Run `tna login` first.")?;
    let mut dashboard = Dashboard::open(portal, None)?;
    if let Some(tab) = tab {
        dashboard.select(tab)?;
    }

    println!();
    println!("=== Welcome, {} ===", session.display_name());
    let tabs: Vec<String> = dashboard
        .tabs()
        .iter()
        .map(|t| {
            if *t == dashboard.active() {
                format!("[{}]", t.label())
            } else {
                t.label().to_string()
            }
        })
        .collect();
    println!("{}", tabs.join("  "));
    println!();

    match dashboard.active() {
        Tab::Surveys if dashboard.role() == Role::Employee => {
            let mut home = EmployeeHome::new();
            home.load(portal).await?;
            println!(
                "Manager:  {}",
                home.manager_name()
                    .or_else(|| home.manager().map(|m| m.id()))
                    .unwrap_or("Not assigned")
            );
            println!("Surveys:  {} pending", home.pending_surveys());
            for survey in home.assigned() {
                println!("  {:<40}  {}", truncate(&survey.title, 40), survey.status);
            }
        }
        Tab::Surveys => {
            let mut created = CreatedSurveys::new();
            created.load(portal).await;
            for survey in created.visible() {
                println!(
                    "  {:<40}  {} responses",
                    truncate(&survey.title, 40),
                    survey.response_count
                );
            }
        }
        Tab::MyResponses => {
            let responses = load_responses(portal).await?;
            for response in responses.responses() {
                println!("  {}", response.title);
            }
        }
        Tab::Submit => {
            println!("Questions ({}):", FIELDS.len());
            for field in FIELDS.iter() {
                println!("  {:<28}  {}", field.name, field.question);
            }
        }
        Tab::MyRequests => {
            let mut mine = MyRequests::new();
            mine.load(portal).await?;
            print_requests(&mine.visible());
        }
        Tab::Review => {
            let mut queue = review_queue(portal)?;
            queue.load(portal).await?;
            print_requests(&queue.visible());
        }
        Tab::Team => {
            let mut team = TeamPanel::new();
            team.load(portal).await;
            if let Some(error) = team.state().error() {
                anyhow::bail!("{}", error);
            }
            for member in team.members() {
                println!("  {:<24}  {:<30}  {}", member.name, member.email, member.department);
            }
        }
        Tab::Training => {
            let mut view = AdminTrainingView::new();
            view.load(portal).await?;
            print_requests(&view.visible());
        }
        Tab::Mapping => {
            let mut editor = MappingEditor::for_portal(portal)?;
            editor.load(portal).await?;
            print_users("Managers", &editor.managers());
            print_users("Employees", &editor.employees());
        }
    }
    println!();
    Ok(())
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_requests(requests: &[&TrainingRequest]) {
    if requests.is_empty() {
        println!("No training requests found.");
        return;
    }
    println!();
    println!(
        "{:<26}  {:<14}  {:<24}  {:<26}  {:<10}",
        "ID", "NUMBER", "REQUESTER", "STATUS", "SUBMITTED"
    );
    println!("{}", "-".repeat(110));
    for request in requests {
        let submitted = request
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<26}  {:<14}  {:<24}  {:<26}  {:<10}",
            request.id,
            truncate(request.display_number(), 14),
            truncate(or_dash(request.requester_name()), 24),
            request.status.label(),
            submitted
        );
    }
    println!();
}

fn print_request(request: &TrainingRequest) {
    println!();
    println!("Request:    {}", request.display_number());
    println!("Requester:  {}", or_dash(request.requester_name()));
    println!("Status:     {}", request.status.label());
    println!();
    for (label, value) in request.fields.details() {
        println!("{}:", label);
        println!("  {}", or_dash(value));
    }
    println!();
}

fn print_users(title: &str, users: &[&User]) {
    println!();
    println!("{}:", title);
    for user in users {
        let manager = user.manager_id().unwrap_or("-");
        println!(
            "  {:<26}  {:<24}  {:<14}  manager: {}",
            user.id,
            truncate(&user.name, 24),
            truncate(or_dash(&user.department), 14),
            manager
        );
    }
}

fn print_redirect(redirect: &Redirect) {
    match redirect.tab {
        Some(tab) => println!("-> {} ({} tab)", redirect.route, tab.label()),
        None => println!("-> {}", redirect.route),
    }
}

fn print_notifications(portal: &Portal) {
    for notification in portal.notifier().drain() {
        println!(
            "[{}] {}",
            notification.kind.as_str(),
            notification.message
        );
    }
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

/// Truncate a string for display
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
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("preferredFormat = Online"),
            Ok(("preferredFormat".to_string(), "Online".to_string()))
        );
        assert_eq!(
            parse_assignment("careerGoals=lead=team"),
            Ok(("careerGoals".to_string(), "lead=team".to_string()))
        );
        assert!(parse_assignment("careerGoals").is_err());
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Développement", 8), "Dével...");
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "tna",
            "training",
            "decide",
            "abc123",
            "approve",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Training(TrainingCommands::Decide {
                decision: Decision::Approve,
                ..
            })
        ));

        let cli = Cli::try_parse_from([
            "tna", "surveys", "fill", "s1", "--answer", "Yes", "--answer", "No", "--edit",
        ])
        .unwrap();
        match cli.command {
            Commands::Surveys(SurveyCommands::Fill { answers, edit, .. }) => {
                assert_eq!(answers, vec!["Yes", "No"]);
                assert!(edit);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["tna", "dashboard", "--tab", "my-requests"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Dashboard {
                tab: Some(Tab::MyRequests)
            }
        ));
    }

    #[test]
    fn test_field_number_is_one_based() {
        assert_eq!(field_number("0"), "1");
        assert_eq!(field_number("title"), "title");
    }

    #[test]
    fn test_question_errors_follow_question_order() {
        let mut errors = FieldErrors::new();
        errors
            .add("10", "Answer required")
            .add("2", "Pick one")
            .add("0", "Answer required")
            .add("title", "Missing");

        let numbers: Vec<String> = question_errors(&errors)
            .into_iter()
            .map(|(number, _)| number)
            .collect();
        assert_eq!(numbers, ["1", "3", "11", "title"]);
        assert_eq!(question_errors(&errors)[2].1, "Answer required");
    }
}
