use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use project_catalog::cache::{CacheLayer, CacheStorage, MemoryStorage, NoopStorage};
use project_catalog::catalog::{ProjectCatalogService, ProjectsFilter};
use project_catalog::config::Config;
use project_catalog::directory::{HttpDirectoryClient, Project, ProjectDirectory};
use project_catalog::logging;

#[derive(Parser, Debug)]
#[command(name = "project-catalog")]
#[command(about = "Query and manage projects through the catalog gateway")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/project-catalog/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List projects, filtered, sorted by name and optionally paged
  List {
    /// Text to look for in project names
    #[arg(short, long)]
    query: Option<String>,

    /// Only projects in this group (repeatable)
    #[arg(short, long = "group")]
    groups: Vec<String>,

    /// Only projects with this tag (repeatable)
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    /// Zero-based page index
    #[arg(short, long, default_value_t = 0)]
    page: usize,

    /// Page size; 0 or less returns every match
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    limit: i64,
  },

  /// Show a single project
  Get { id: String },

  /// Create a project from a JSON file
  Create {
    #[arg(short, long)]
    file: PathBuf,
  },

  /// Replace a project with the contents of a JSON file
  Update {
    id: String,
    #[arg(short, long)]
    file: PathBuf,
  },

  /// Delete a project
  Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.logging)?;

  let directory = HttpDirectoryClient::new(&config.directory, Config::get_api_token())?;

  let storage: Arc<dyn CacheStorage> = if config.cache.enabled {
    Arc::new(MemoryStorage::new())
  } else {
    Arc::new(NoopStorage)
  };
  let cache = CacheLayer::new(storage)
    .with_ttl(config.cache.ttl())
    .with_coalescing(config.cache.coalesce_fetches);

  let service = ProjectCatalogService::new(directory, cache);
  run(&service, args.command).await
}

async fn run<D: ProjectDirectory>(service: &ProjectCatalogService<D>, command: Command) -> Result<()> {
  match command {
    Command::List {
      query,
      groups,
      tags,
      page,
      limit,
    } => {
      let filter = ProjectsFilter {
        query,
        groups: non_empty(groups),
        tags: non_empty(tags),
        page,
        limit,
      };
      print_json(&service.get_projects(&filter).await?)
    }
    Command::Get { id } => print_json(&service.get_project(&id).await?),
    Command::Create { file } => {
      let project = read_project(&file)?;
      service.create_project(&project).await?;
      eprintln!("Created project {}", project.id);
      Ok(())
    }
    Command::Update { id, file } => {
      let project = read_project(&file)?;
      service.update_project(&id, &project).await?;
      eprintln!("Updated project {}", id);
      Ok(())
    }
    Command::Delete { id } => {
      service.delete_project(&id).await?;
      eprintln!("Deleted project {}", id);
      Ok(())
    }
  }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
  (!values.is_empty()).then_some(values)
}

fn read_project(path: &Path) -> Result<Project> {
  let contents = std::fs::read_to_string(path)
    .map_err(|e| eyre!("Failed to read project file {}: {}", path.display(), e))?;

  serde_json::from_str(&contents)
    .map_err(|e| eyre!("Failed to parse project file {}: {}", path.display(), e))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
