use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use jiff::civil::Date;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use taskboard::{
    Config, RootStore,
    models::{FilterUpdate, Priority, PriorityFilter, StatusFilter, Task, TagWithStats},
    storage::json::JsonFileStorage,
    stores::{
        projects::{CreateProjectParameters, UpdateProjectParameters},
        tags::{CreateTagParameters, UpdateTagParameters},
        tasks::{CreateTaskParameters, UpdateTaskParameters},
    },
    system::{EnvSystemTheme, TracingThemeSink},
};

mod ui;

#[derive(Parser)]
#[command(name = "taskboard", about = "Tasks, projects and tags on a local board")]
struct Cli {
    /// Storage file holding the board
    #[arg(long, env = "TASKBOARD_STORE", global = true)]
    store: Option<PathBuf>,

    /// Delay before the saved tasks are read, in milliseconds
    #[arg(long, env = "TASKBOARD_LOAD_DELAY_MS", global = true)]
    load_delay_ms: Option<u64>,

    /// Start from an empty board instead of the sample data
    #[arg(long, global = true)]
    empty: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Active,
    Completed,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => StatusFilter::All,
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Completed => StatusFilter::Completed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks matching the given filters
    List {
        /// Search title and description
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,

        /// Only tasks of this project id
        #[arg(long)]
        project: Option<String>,

        /// Only tasks carrying this tag id (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tag: Vec<String>,

        /// Group the whole board by priority instead
        #[arg(long)]
        by_priority: bool,
    },

    /// Add a new task
    Add {
        /// Task title
        title: String,

        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,

        /// Project id
        #[arg(long)]
        project: Option<String>,

        /// Add tag ids (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tag: Vec<String>,

        /// Due date (e.g., "2025-03-01")
        #[arg(short, long)]
        due: Option<Date>,

        #[arg(short = 'n', long)]
        description: Option<String>,
    },

    /// Edit a task
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short = 'n', long)]
        description: Option<String>,

        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,

        #[arg(long)]
        project: Option<String>,

        /// Replace tag ids (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tag: Vec<String>,

        #[arg(short, long, conflicts_with = "no_due")]
        due: Option<Date>,

        /// Remove the due date
        #[arg(long)]
        no_due: bool,
    },

    /// Toggle a task between done and open
    Done { id: String },

    /// Delete a task
    Rm { id: String },

    /// Remove every completed task
    Clear,

    /// Show task statistics
    Stats,

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Manage tags
    #[command(subcommand)]
    Tag(TagCommands),

    /// Toggle the color theme
    Theme,
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Create a new project
    New {
        name: String,
        #[arg(short, long, default_value = "#9e9e9e")]
        color: String,
        #[arg(short = 'n', long)]
        description: Option<String>,
    },
    /// Rename or recolor a project
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
        #[arg(short = 'n', long)]
        description: Option<String>,
    },
    /// Delete a project (its tasks are kept)
    Rm { id: String },
    /// List all projects with task counts
    List,
}

#[derive(Subcommand)]
enum TagCommands {
    /// Create a new tag
    New {
        name: String,
        #[arg(short, long, default_value = "#9e9e9e")]
        color: String,
    },
    /// Rename or recolor a tag
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Delete a tag
    Rm { id: String },
    /// List all tags with usage counts
    List,
    /// List tags in use, most used first
    Popular,
}

fn init_tracing() {
    // Tracing is opt-in via RUST_LOG.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn fail(message: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("{} {}: {}", "Error:".red().bold(), message, error);
    std::process::exit(1);
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let defaults = Config::default();
    let config = Config {
        storage_path: cli.store.unwrap_or(defaults.storage_path),
        load_delay: cli
            .load_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.load_delay),
        seed: !cli.empty,
    };

    // Create parent directory if it doesn't exist
    if let Some(parent) = config.storage_path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| fail("Failed to create data directory", e));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap_or_else(|e| fail("Failed to start runtime", e));

    let storage = JsonFileStorage::new(config.storage_path.clone());
    let mut root = RootStore::new(storage, &config, Box::new(TracingThemeSink));

    if let Err(e) = root.init_theme(&EnvSystemTheme) {
        fail("Failed to read theme", e);
    }
    if let Err(e) = runtime.block_on(root.load_all()) {
        fail("Failed to load board", e);
    }

    let changed = run(&mut root, cli.command.unwrap_or(Commands::List {
        search: None,
        status: Some(StatusArg::Active),
        priority: None,
        project: None,
        tag: vec![],
        by_priority: false,
    }));

    if changed && let Err(e) = root.save_all() {
        // The command already took effect in memory.
        eprintln!("{} could not save board: {}", "Warning:".yellow().bold(), e);
    }
}

/// Runs one command against the board. Returns whether anything was mutated.
fn run(root: &mut RootStore<JsonFileStorage>, command: Commands) -> bool {
    let now = jiff::Timestamp::now();

    match command {
        Commands::List {
            search,
            status,
            priority,
            project,
            tag,
            by_priority,
        } => {
            if by_priority {
                let buckets = root.tasks.tasks_by_priority();
                ui::render_view_header("By priority", root.tasks.tasks().len());
                for (title, tasks) in [
                    ("High", &buckets.high),
                    ("Medium", &buckets.medium),
                    ("Low", &buckets.low),
                ] {
                    ui::render_section_header(title);
                    for task in tasks {
                        ui::render_task_line(task, &root.projects, &root.tags, now);
                    }
                }
                return false;
            }

            root.tasks.set_filters(FilterUpdate {
                search_query: search,
                status: status.map(StatusFilter::from),
                priority: priority.map(|p| PriorityFilter::from(Priority::from(p))),
                project_id: project.map(Some),
                tag_ids: (!tag.is_empty()).then_some(tag),
            });

            let tasks = root.tasks.filtered_tasks();
            if tasks.is_empty() {
                println!("No matching tasks");
            } else {
                ui::render_view_header("Tasks", tasks.len());
                for task in tasks {
                    ui::render_task_line(task, &root.projects, &root.tags, now);
                }
            }
            false
        }
        Commands::Add {
            title,
            priority,
            project,
            tag,
            due,
            description,
        } => {
            let parameters = CreateTaskParameters {
                title: Some(title),
                description: description.unwrap_or_default(),
                completed: false,
                priority: priority.map(Priority::from),
                due_date: due,
                project_id: project,
                tag_ids: tag,
            };
            match root.tasks.create_task(parameters) {
                Ok(task) => {
                    println!("{} {}", "Added".green(), task.title.bold());
                    ui::render_task_line(&task, &root.projects, &root.tags, now);
                    true
                }
                Err(e) => fail("Failed to add task", e),
            }
        }
        Commands::Edit {
            id,
            title,
            description,
            priority,
            project,
            tag,
            due,
            no_due,
        } => {
            let due_date = if no_due { Some(None) } else { due.map(Some) };
            let parameters = UpdateTaskParameters {
                id,
                title,
                description,
                completed: None,
                priority: priority.map(Priority::from),
                due_date,
                project_id: project,
                tag_ids: (!tag.is_empty()).then_some(tag),
            };
            let updated = root.tasks.update_task(parameters);
            report_task(root, updated, "Updated", now)
        }
        Commands::Done { id } => {
            let toggled = root.tasks.toggle_task(&id);
            let verb = match &toggled {
                Some(task) if task.completed => "Completed",
                _ => "Reopened",
            };
            report_task(root, toggled, verb, now)
        }
        Commands::Rm { id } => match root.tasks.delete_task(&id) {
            Some(task) => {
                println!("{} {}", "Deleted".red(), task.title);
                true
            }
            None => {
                println!("No task with id {}", id);
                false
            }
        },
        Commands::Clear => {
            let removed = root.tasks.clear_completed();
            println!("Removed {} completed task(s)", removed);
            removed > 0
        }
        Commands::Stats => {
            ui::render_stats(&root.tasks.stats_at(now));
            false
        }
        Commands::Project(command) => run_project(root, command),
        Commands::Tag(command) => run_tag(root, command),
        Commands::Theme => match root.toggle_theme() {
            Ok(theme) => {
                ui::render_theme(theme);
                false
            }
            Err(e) => fail("Failed to save theme", e),
        },
    }
}

fn report_task(
    root: &RootStore<JsonFileStorage>,
    task: Option<Task>,
    verb: &str,
    now: jiff::Timestamp,
) -> bool {
    match task {
        Some(task) => {
            println!("{}", verb.green());
            ui::render_task_line(&task, &root.projects, &root.tags, now);
            true
        }
        None => {
            println!("No such task");
            false
        }
    }
}

fn run_project(root: &mut RootStore<JsonFileStorage>, command: ProjectCommands) -> bool {
    match command {
        ProjectCommands::New {
            name,
            color,
            description,
        } => match root.projects.create_project(CreateProjectParameters {
            name,
            color,
            description,
        }) {
            Ok(project) => {
                println!("{} {} ({})", "Created project".green(), project.name.bold(), project.id);
                true
            }
            Err(e) => fail("Failed to create project", e),
        },
        ProjectCommands::Edit {
            id,
            name,
            color,
            description,
        } => {
            let updated = root.projects.update_project(UpdateProjectParameters {
                id,
                name,
                color,
                description: description.map(Some),
            });
            match updated {
                Some(project) => {
                    println!("{} {}", "Updated project".green(), project.name.bold());
                    true
                }
                None => {
                    println!("No such project");
                    false
                }
            }
        }
        ProjectCommands::Rm { id } => match root.projects.delete_project(&id) {
            Some(project) => {
                println!("{} {}", "Deleted project".red(), project.name);
                true
            }
            None => {
                println!("No such project");
                false
            }
        },
        ProjectCommands::List => {
            let projects = root.projects_with_stats();
            if projects.is_empty() {
                println!("No projects");
            } else {
                println!("\n  {}\n", "Projects".cyan().bold());
                for entry in &projects {
                    ui::render_project_line(entry);
                }
            }
            false
        }
    }
}

fn run_tag(root: &mut RootStore<JsonFileStorage>, command: TagCommands) -> bool {
    match command {
        TagCommands::New { name, color } => {
            match root.tags.create_tag(CreateTagParameters { name, color }) {
                Ok(tag) => {
                    println!("{} {} ({})", "Created tag".green(), tag.name.bold(), tag.id);
                    true
                }
                Err(e) => fail("Failed to create tag", e),
            }
        }
        TagCommands::Edit { id, name, color } => {
            match root.tags.update_tag(UpdateTagParameters { id, name, color }) {
                Some(tag) => {
                    println!("{} {}", "Updated tag".green(), tag.name.bold());
                    true
                }
                None => {
                    println!("No such tag");
                    false
                }
            }
        }
        TagCommands::Rm { id } => match root.tags.delete_tag(&id) {
            Some(tag) => {
                println!("{} {}", "Deleted tag".red(), tag.name);
                true
            }
            None => {
                println!("No such tag");
                false
            }
        },
        TagCommands::List => {
            render_tags("Tags", &root.tags_with_stats());
            false
        }
        TagCommands::Popular => {
            render_tags("Popular tags", &root.popular_tags());
            false
        }
    }
}

fn render_tags(title: &str, tags: &[TagWithStats]) {
    if tags.is_empty() {
        println!("No tags");
        return;
    }
    println!("\n  {}\n", title.cyan().bold());
    for entry in tags {
        ui::render_tag_line(entry);
    }
}
