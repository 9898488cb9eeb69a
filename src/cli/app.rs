//! CLI application handler
//!
//! Translates subcommands into workspace events and prints the results. No
//! note logic lives here.
use std::{
    fs::{self, read_to_string},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use console::style;
use log::info;
use shell_words::split;
use tempfile::Builder;

use crate::{
    download_file_name, history_listing, Commands, Config, FileKeyValueStore, Note, NoteStats,
    NotesError, Result, Theme, Workspace, EXPORT_FILE_NAME,
};

/// CLI Application handler - processes CLI commands against a workspace
pub struct App {
    /// The shared note workspace
    workspace: Workspace<FileKeyValueStore>,

    /// Application configuration
    config: Config,

    /// Where `config --reset` writes to
    config_path: Option<PathBuf>,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application over the given workspace and config
    pub fn new(
        workspace: Workspace<FileKeyValueStore>,
        config: Config,
        config_path: Option<PathBuf>,
        verbose: bool,
    ) -> Self {
        Self {
            workspace,
            config,
            config_path,
            verbose,
        }
    }

    /// Run the CLI application with the given command, then flush pending edits
    pub async fn run(&self, command: Commands) -> Result<()> {
        let outcome = self.dispatch(command).await;
        self.workspace.shutdown().await?;
        outcome
    }

    async fn dispatch(&self, command: Commands) -> Result<()> {
        match command {
            Commands::New { title } => self.create_note(title).await,
            Commands::List { json } => self.list_notes(json).await,
            Commands::Show { id } => self.show_note(id).await,
            Commands::Select { id } => {
                let note = self.workspace.select_note(&id).await?;
                println!("Active note: {} ({})", note.display_title(), note.id);
                Ok(())
            }
            Commands::Rename { id, title } => {
                let session = self.workspace.session();
                let note = session.lock().await.rename_note(&id, &title)?;
                println!("Renamed note {} to \"{}\"", note.id, note.title);
                Ok(())
            }
            Commands::Edit {
                id,
                content,
                file,
                editor,
            } => self.edit_note(id, content, file, editor).await,
            Commands::Delete { id, force } => self.handle_delete(id, force).await,
            Commands::History { id } => self.show_history(id).await,
            Commands::Restore { id, index } => {
                let note = self.workspace.restore_history(&id, index).await?;
                println!(
                    "Note restored from history ({} entries left)",
                    note.history.len()
                );
                Ok(())
            }
            Commands::Export { output } => self.export_notes(output).await,
            Commands::Import { source } => self.import_notes(source).await,
            Commands::Download { id, output } => self.download_note(id, output).await,
            Commands::Suggest { id, cursor } => self.suggest(id, cursor).await,
            Commands::Complete { id, cursor, choice } => {
                let session = self.workspace.session();
                let (_, splice) = session.lock().await.complete(&id, cursor, &choice)?;
                println!("Inserted \"{}\"; cursor now at {}", choice, splice.cursor);
                Ok(())
            }
            Commands::Autocomplete { state } => {
                let enabled = state == "on";
                let session = self.workspace.session();
                session.lock().await.set_autocomplete(enabled)?;
                println!("Autocomplete {}", if enabled { "enabled" } else { "disabled" });
                Ok(())
            }
            Commands::Theme { value } => self.handle_theme(value).await,
            Commands::Config { show, reset } => self.handle_config(show, reset),
        }
    }

    async fn create_note(&self, title: Option<String>) -> Result<()> {
        let mut note = self.workspace.create_note().await?;
        if let Some(title) = title {
            let session = self.workspace.session();
            note = session.lock().await.rename_note(&note.id, &title)?;
        }

        println!("Note created with ID: {}", note.id);
        Ok(())
    }

    async fn list_notes(&self, json: bool) -> Result<()> {
        let session = self.workspace.session();
        let session = session.lock().await;
        let notes = session.store().notes();

        if json {
            let brief: Vec<serde_json::Value> = notes
                .iter()
                .map(|note| {
                    serde_json::json!({
                        "id": note.id,
                        "title": note.display_title(),
                        "updated": note.updated.to_rfc3339(),
                        "history": note.history.len(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&brief)?);
            return Ok(());
        }

        if notes.is_empty() {
            println!("No notes yet");
            return Ok(());
        }

        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);
        let active_id = session.store().active_id();

        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }
            let marker = if active_id == Some(note.id.as_str()) { "*" } else { " " };
            println!(
                "{} {} | {}",
                marker,
                style(note.display_title()).bold(),
                note.updated.format("%b %-d, %Y · %-I:%M %p")
            );
            if self.verbose {
                println!("  ID: {}", note.id);
            }
        }

        println!(
            "\nFound {} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    async fn show_note(&self, id: Option<String>) -> Result<()> {
        let session = self.workspace.session();
        let session = session.lock().await;

        let note = match &id {
            Some(id) => session.store().get(id),
            None => session.active_note(),
        }
        .ok_or_else(|| NotesError::NoteNotFound {
            id: id.clone().unwrap_or_default(),
        })?;

        let stats = NoteStats::of(&note.content);
        println!("{}", style(note.display_title()).bold());
        println!(
            "{} words · {} characters · {} read",
            stats.words,
            stats.characters,
            stats.reading_time()
        );
        println!();
        println!("{}", note.content);
        Ok(())
    }

    async fn edit_note(
        &self,
        id: String,
        content: Option<String>,
        file: Option<PathBuf>,
        editor: bool,
    ) -> Result<()> {
        let current = {
            let session = self.workspace.session();
            let session = session.lock().await;
            session
                .store()
                .get(&id)
                .map(|note| note.content.clone())
                .ok_or_else(|| NotesError::NoteNotFound { id: id.clone() })?
        };

        let new_content = match (content, file) {
            (Some(c), _) => c,
            (_, Some(file_path)) => {
                if !file_path.exists() {
                    return Err(NotesError::FileNotFound {
                        file_path: file_path.display().to_string(),
                    });
                }
                read_to_string(file_path)?
            }
            (None, None) if editor => self.open_editor_for_content(&current)?,
            (None, None) => {
                return Err(NotesError::EditorError {
                    message: "Provide --content, --file or --editor".to_string(),
                });
            }
        };

        let cursor = new_content.chars().count();
        self.workspace.edit_content(&id, &new_content, cursor).await?;
        self.workspace.commit_now(&id).await?;
        println!("Note {} updated", id);
        Ok(())
    }

    fn open_editor_for_content(&self, current: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".txt").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();
        fs::write(&temp_path, current)?;

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor to write note content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        Ok(read_to_string(&temp_path)?)
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let args = split(editor_cmd).map_err(|e| NotesError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, rest)) = args.split_first() else {
            return Err(NotesError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        let status = Command::new(program).args(rest).arg(file_path).status()?;
        if !status.success() {
            return Err(NotesError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }

    async fn handle_delete(&self, id: String, force: bool) -> Result<()> {
        let note = {
            let session = self.workspace.session();
            let session = session.lock().await;
            session
                .store()
                .get(&id)
                .cloned()
                .ok_or_else(|| NotesError::NoteNotFound { id: id.clone() })?
        };

        if !force && !confirm_delete(&note)? {
            println!("Deletion cancelled.");
            return Ok(());
        }

        let removed = self.workspace.delete_note(&id).await?;
        println!("Note \"{}\" deleted", removed.display_title());
        Ok(())
    }

    async fn show_history(&self, id: String) -> Result<()> {
        let session = self.workspace.session();
        let session = session.lock().await;
        let note = session
            .store()
            .get(&id)
            .ok_or_else(|| NotesError::NoteNotFound { id: id.clone() })?;

        if note.history.is_empty() {
            println!("No history available for this note");
            return Ok(());
        }

        for item in history_listing(&note.history) {
            println!(
                "[{}] {}  {}",
                item.index,
                item.timestamp.format("%Y-%m-%d %H:%M:%S"),
                style(item.preview).dim()
            );
        }
        Ok(())
    }

    async fn export_notes(&self, output: Option<PathBuf>) -> Result<()> {
        let json = {
            let session = self.workspace.session();
            let session = session.lock().await;
            session.export_json()?
        };

        let path = output.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
        fs::write(&path, json)?;
        println!("All notes exported to {}", path.display());
        Ok(())
    }

    async fn import_notes(&self, source: PathBuf) -> Result<()> {
        if !source.exists() {
            return Err(NotesError::FileNotFound {
                file_path: source.display().to_string(),
            });
        }

        let raw = fs::read(&source)?;
        let summary = self.workspace.import(&raw).await?;
        println!(
            "Imported {} notes ({} already present)",
            summary.added, summary.skipped
        );
        Ok(())
    }

    async fn download_note(&self, id: String, output: Option<PathBuf>) -> Result<()> {
        let note = {
            let session = self.workspace.session();
            let session = session.lock().await;
            session
                .store()
                .get(&id)
                .cloned()
                .ok_or_else(|| NotesError::NoteNotFound { id: id.clone() })?
        };

        let dir = output.unwrap_or_else(|| PathBuf::from("."));
        let path = dir.join(download_file_name(&note.title));
        fs::write(&path, &note.content)?;
        println!("Note downloaded to {}", path.display());
        Ok(())
    }

    async fn suggest(&self, id: String, cursor: usize) -> Result<()> {
        let session = self.workspace.session();
        let session = session.lock().await;

        if !session.autocomplete_enabled() {
            println!("Autocomplete is disabled");
            return Ok(());
        }

        let suggestions = session.suggest(&id, cursor)?;
        if suggestions.is_empty() {
            println!("No suggestions");
        }
        for suggestion in suggestions {
            println!("{} (replaces from offset {})", suggestion.text, suggestion.start);
        }
        Ok(())
    }

    async fn handle_theme(&self, value: Option<String>) -> Result<()> {
        let session = self.workspace.session();
        let mut session = session.lock().await;

        let theme = match value.as_deref() {
            None => session.theme(),
            Some("toggle") => session.toggle_theme()?,
            Some(other) => session.set_theme(other.parse::<Theme>()?)?,
        };
        println!("Theme: {}", theme);
        Ok(())
    }

    fn handle_config(&self, show: bool, reset: bool) -> Result<()> {
        if reset {
            let path = self
                .config_path
                .clone()
                .ok_or_else(|| NotesError::ConfigError {
                    message: "No configuration path available".to_string(),
                })?;
            Config::default().save(&path)?;
            println!("Configuration reset at {}", path.display());
        }

        if show || !reset {
            println!("{}", serde_json::to_string_pretty(&self.config)?);
        }
        Ok(())
    }
}

fn confirm_delete(note: &Note) -> Result<bool> {
    println!("You are about to delete the following note:");
    println!("ID:      {}", note.id);
    println!("Title:   {}", note.display_title());
    println!("Created: {}", note.created.format("%Y-%m-%d %H:%M:%S"));

    println!("\nThis action cannot be undone!");
    print!("Are you sure you want to delete this note? [y/N]: ");
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
