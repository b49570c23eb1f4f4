//! The interactive shell: input lines in, rendered session events out.
//!
//! The shell never renders state it changed itself. It turns each line into
//! a [`Command`], executes it on the [`BrowserSession`], and prints whatever
//! events the session published in response.

use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use burrow_core::{BrowserSession, Command, Event, FileSystemService};
use tokio::sync::mpsc;

use crate::input::{parse_line, Input, HELP};
use crate::render::{render_clipboard, render_listing};

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<W: Write> {
    session: BrowserSession,
    events: mpsc::UnboundedReceiver<Event>,
    confirm_delete: bool,
    /// A delete waiting for a yes/no answer.
    pending: Option<Command>,
    out: W,
}

impl<W: Write> Shell<W> {
    /// Opens a session on `service` and prints the first listing.
    pub async fn start(
        service: Arc<dyn FileSystemService>,
        start_dir: Option<PathBuf>,
        confirm_delete: bool,
        out: W,
    ) -> anyhow::Result<Self> {
        let (tx, events) = mpsc::unbounded_channel();
        let mut session = BrowserSession::new(service).with_events(tx);
        session.start(start_dir).await?;

        let mut shell = Self {
            session,
            events,
            confirm_delete,
            pending: None,
            out,
        };
        shell.render_events()?;
        Ok(shell)
    }

    /// Writes the prompt, showing the current directory.
    pub fn prompt(&mut self) -> anyhow::Result<()> {
        let location = self
            .session
            .current_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        write!(self.out, "{location} > ")?;
        self.out.flush()?;
        Ok(())
    }

    /// Handles one input line.
    pub async fn handle_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        if let Some(command) = self.pending.take() {
            let answer = line.trim().to_ascii_lowercase();
            if answer == "y" || answer == "yes" {
                self.run(command).await?;
            } else {
                writeln!(self.out, "cancelled")?;
            }
            return Ok(Flow::Continue);
        }

        let input = match parse_line(line) {
            Ok(input) => input,
            Err(err) => {
                writeln!(self.out, "error: {err}")?;
                return Ok(Flow::Continue);
            }
        };

        match input {
            Input::Empty => {}
            Input::Quit => return Ok(Flow::Quit),
            Input::Help => writeln!(self.out, "{HELP}")?,
            Input::List => self.list()?,
            Input::Status => self.status()?,
            Input::ChangeDir(target) => self.change_dir(&target).await?,
            Input::Back => self.run(Command::GoBack).await?,
            Input::Home => self.run(Command::GoHome).await?,
            Input::Refresh => self.run(Command::Refresh).await?,
            Input::Select(names) => {
                for name in names {
                    if let Some(path) = self.lookup(&name)? {
                        self.run(Command::Select(path)).await?;
                    }
                }
            }
            Input::Deselect(names) => {
                for name in names {
                    if let Some(path) = self.lookup(&name)? {
                        self.run(Command::Deselect(path)).await?;
                    }
                }
            }
            Input::SelectAll => self.run(Command::ToggleAll).await?,
            Input::SelectNone => self.run(Command::ClearSelection).await?,
            Input::Copy => self.run(Command::Copy).await?,
            Input::Cut => self.run(Command::Cut).await?,
            Input::Paste => self.run(Command::Paste).await?,
            Input::Remove(names) => self.remove(names).await?,
            Input::Rename { from, to } => {
                if let Some(path) = self.lookup(&from)? {
                    self.run(Command::Rename(path, to)).await?;
                }
            }
            Input::MakeDir(name) => self.run(Command::CreateFolder(name)).await?,
            Input::Touch(name) => self.run(Command::CreateFile(name)).await?,
        }
        Ok(Flow::Continue)
    }

    async fn run(&mut self, command: Command) -> anyhow::Result<()> {
        if let Err(err) = self.session.execute(command).await {
            tracing::debug!("command failed: {err}");
        }
        self.render_events()
    }

    async fn change_dir(&mut self, target: &str) -> anyhow::Result<()> {
        let command = match target {
            "~" => Command::GoHome,
            ".." => match self.session.current_path().and_then(Path::parent) {
                Some(parent) => Command::Navigate(parent.to_path_buf()),
                None => {
                    writeln!(self.out, "already at the root")?;
                    return Ok(());
                }
            },
            other => {
                let path = Path::new(other);
                match self.session.current_path() {
                    Some(current) if path.is_relative() => {
                        Command::Navigate(normalize(&current.join(path)))
                    }
                    _ => Command::Navigate(normalize(path)),
                }
            }
        };
        self.run(command).await
    }

    async fn remove(&mut self, names: Vec<String>) -> anyhow::Result<()> {
        let (command, count) = if names.is_empty() {
            (Command::DeleteSelected, self.session.selection().len())
        } else {
            let mut paths = Vec::with_capacity(names.len());
            for name in &names {
                match self.lookup(name)? {
                    Some(path) => paths.push(path),
                    None => return Ok(()),
                }
            }
            let count = paths.len();
            (Command::Delete(paths), count)
        };

        if self.confirm_delete && count > 0 {
            writeln!(self.out, "delete {count} item(s)? [y/N]")?;
            self.pending = Some(command);
            return Ok(());
        }
        self.run(command).await
    }

    /// Resolves `name` against the current listing, reporting unknown names.
    fn lookup(&mut self, name: &str) -> anyhow::Result<Option<PathBuf>> {
        let found = self
            .session
            .snapshot()
            .and_then(|s| s.find_by_name(name))
            .map(|e| e.path().to_path_buf());
        if found.is_none() {
            writeln!(self.out, "no such entry: {name}")?;
        }
        Ok(found)
    }

    fn list(&mut self) -> anyhow::Result<()> {
        match self.session.snapshot() {
            Some(snapshot) => {
                let text = render_listing(snapshot, self.session.selection(), SystemTime::now());
                writeln!(self.out, "{text}")?;
            }
            None => writeln!(self.out, "nothing listed")?,
        }
        Ok(())
    }

    fn status(&mut self) -> anyhow::Result<()> {
        let history = self.session.history();
        let position = history.cursor().map_or(0, |c| c + 1);
        let location = self
            .session
            .current_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_owned());
        writeln!(self.out, "location: {location}")?;
        writeln!(self.out, "history: {position}/{}", history.len())?;
        writeln!(self.out, "selected: {}", self.session.selection().len())?;
        writeln!(
            self.out,
            "{}",
            render_clipboard(self.session.clipboard_mode(), self.session.clipboard().len())
        )?;
        if self.session.in_flight() {
            writeln!(self.out, "busy")?;
        }
        Ok(())
    }

    fn render_events(&mut self) -> anyhow::Result<()> {
        while let Ok(event) = self.events.try_recv() {
            match event {
                Event::DirectoryLoaded(snapshot) => {
                    let text =
                        render_listing(&snapshot, self.session.selection(), SystemTime::now());
                    writeln!(self.out, "{text}")?;
                }
                Event::SelectionChanged { count } => writeln!(self.out, "{count} selected")?,
                Event::ClipboardChanged { mode, items } => {
                    writeln!(self.out, "{}", render_clipboard(mode, items))?;
                }
                Event::OperationComplete { operation } => {
                    tracing::debug!("{operation}: done");
                }
                Event::OperationFailed { operation, error } => {
                    tracing::info!("{operation} failed: {error}");
                    writeln!(self.out, "error: {error}")?;
                }
            }
        }
        Ok(())
    }
}

/// Drops `.` and resolves `..` lexically; `..` at the root stays there.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::LocalFileSystem;
    use std::fs;
    use tempfile::TempDir;

    async fn shell_in(dir: &Path, confirm_delete: bool) -> Shell<Vec<u8>> {
        Shell::start(
            Arc::new(LocalFileSystem::new()),
            Some(dir.to_path_buf()),
            confirm_delete,
            Vec::new(),
        )
        .await
        .unwrap()
    }

    /// Returns and clears everything written so far.
    fn take_output(shell: &mut Shell<Vec<u8>>) -> String {
        String::from_utf8(std::mem::take(&mut shell.out)).unwrap()
    }

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "aaa").unwrap();
        fs::write(tmp.path().join("b.txt"), "b").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        tmp
    }

    #[tokio::test]
    async fn start_prints_listing() {
        let tmp = fixture();
        let mut shell = shell_in(tmp.path(), false).await;

        let out = take_output(&mut shell);

        assert!(out.contains("(3 item(s))"));
        assert!(out.contains("a.txt"));
        assert!(out.contains("sub/"));
    }

    #[tokio::test]
    async fn mkdir_reprints_listing() {
        let tmp = fixture();
        let mut shell = shell_in(tmp.path(), false).await;
        take_output(&mut shell);

        shell.handle_line("mkdir docs").await.unwrap();

        assert!(tmp.path().join("docs").is_dir());
        assert!(take_output(&mut shell).contains("docs/"));
    }

    #[tokio::test]
    async fn copy_then_paste_into_subfolder() {
        let tmp = fixture();
        let mut shell = shell_in(tmp.path(), false).await;

        for line in ["select a.txt b.txt", "copy", "cd sub", "paste"] {
            assert_eq!(shell.handle_line(line).await.unwrap(), Flow::Continue);
        }

        assert_eq!(fs::read_to_string(tmp.path().join("sub/a.txt")).unwrap(), "aaa");
        assert!(tmp.path().join("sub/b.txt").exists());
        assert!(tmp.path().join("a.txt").exists());
        let out = take_output(&mut shell);
        assert!(out.contains("2 selected"));
        assert!(out.contains("clipboard: copy 2 item(s)"));
    }

    #[tokio::test]
    async fn cd_dotdot_goes_to_parent() {
        let tmp = fixture();
        let mut shell = shell_in(&tmp.path().join("sub"), false).await;

        shell.handle_line("cd ..").await.unwrap();

        assert_eq!(shell.session.current_path(), Some(tmp.path()));
        assert_eq!(shell.session.history().len(), 2);
    }

    #[tokio::test]
    async fn cd_resolves_parent_segments() {
        let tmp = fixture();
        let mut shell = shell_in(&tmp.path().join("sub"), false).await;

        shell.handle_line("cd ../sub/./../sub").await.unwrap();

        assert_eq!(
            shell.session.current_path(),
            Some(tmp.path().join("sub").as_path())
        );
    }

    #[test]
    fn normalize_stops_at_root() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Path::new("/../..")), PathBuf::from("/"));
    }

    #[tokio::test]
    async fn rm_asks_for_confirmation() {
        let tmp = fixture();
        let mut shell = shell_in(tmp.path(), true).await;
        take_output(&mut shell);

        shell.handle_line("rm a.txt").await.unwrap();
        assert!(take_output(&mut shell).contains("delete 1 item(s)? [y/N]"));
        shell.handle_line("n").await.unwrap();
        assert!(take_output(&mut shell).contains("cancelled"));
        assert!(tmp.path().join("a.txt").exists());

        shell.handle_line("rm a.txt").await.unwrap();
        shell.handle_line("y").await.unwrap();
        assert!(!tmp.path().join("a.txt").exists());
    }

    #[tokio::test]
    async fn rm_selection_without_confirmation() {
        let tmp = fixture();
        let mut shell = shell_in(tmp.path(), false).await;

        shell.handle_line("all").await.unwrap();
        shell.handle_line("rm").await.unwrap();

        assert!(fs::read_dir(tmp.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn unknown_names_are_reported() {
        let tmp = fixture();
        let mut shell = shell_in(tmp.path(), false).await;
        take_output(&mut shell);

        shell.handle_line("select nope").await.unwrap();
        shell.handle_line("mv nope other").await.unwrap();

        let out = take_output(&mut shell);
        assert_eq!(out.matches("no such entry: nope").count(), 2);
    }

    #[tokio::test]
    async fn failures_print_one_line() {
        let tmp = fixture();
        let mut shell = shell_in(tmp.path(), false).await;
        take_output(&mut shell);

        shell.handle_line("cd missing").await.unwrap();
        shell.handle_line("paste").await.unwrap();
        shell.handle_line("mv a.txt b.txt").await.unwrap();

        let out = take_output(&mut shell);
        let errors: Vec<&str> = out.lines().filter(|l| l.starts_with("error: ")).collect();
        assert_eq!(errors.len(), 3, "{out}");
        assert!(errors[0].contains("cannot open"));
        assert_eq!(errors[1], "error: clipboard is empty");
        assert!(errors[2].contains("already exists"));
    }

    #[tokio::test]
    async fn status_and_quit() {
        let tmp = fixture();
        let mut shell = shell_in(tmp.path(), false).await;
        take_output(&mut shell);

        shell.handle_line("select b.txt").await.unwrap();
        shell.handle_line("cut").await.unwrap();
        take_output(&mut shell);
        shell.handle_line("status").await.unwrap();

        let out = take_output(&mut shell);
        assert!(out.contains("history: 1/1"));
        assert!(out.contains("selected: 1"));
        assert!(out.contains("clipboard: cut 1 item(s)"));
        assert_eq!(shell.handle_line("quit").await.unwrap(), Flow::Quit);
    }

    #[tokio::test]
    async fn parse_errors_are_printed() {
        let tmp = fixture();
        let mut shell = shell_in(tmp.path(), false).await;
        take_output(&mut shell);

        shell.handle_line("bogus").await.unwrap();

        assert_eq!(
            take_output(&mut shell),
            "error: unknown command: bogus (try `help`)\n"
        );
    }
}
