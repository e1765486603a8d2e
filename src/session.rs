//! Interactive host loop.
//!
//! Commands arrive one line at a time on stdin and config-change events
//! arrive from a file watcher. Both feed the same serial dispatch, so only
//! one sync is ever in flight.

use std::ffi::{OsStr, OsString};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::IssueSource;
use crate::config::ConfigSource;
use crate::error::Result;
use crate::host::Host;
use crate::orchestrator::SyncOrchestrator;
use crate::output;

const HELP: &str = "Commands:
  sync, s       Fetch the first page
  next, n       Fetch the next page
  prev, p       Fetch the previous page
  toggle, t     Switch grouping between author and file
  reload, r     Re-read configuration and sync
  help, h       Show this help
  quit, q       Exit";

/// Triggers the host can deliver to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Start,
    NextPage,
    PrevPage,
    ToggleGrouping,
    ConfigChanged,
    Help,
    Quit,
}

impl HostEvent {
    /// Parse one line of user input. `None` for unrecognized commands.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "sync" | "start" | "s" => Some(Self::Start),
            "next" | "n" => Some(Self::NextPage),
            "prev" | "p" => Some(Self::PrevPage),
            "toggle" | "t" => Some(Self::ToggleGrouping),
            "reload" | "r" => Some(Self::ConfigChanged),
            "help" | "h" | "?" => Some(Self::Help),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Live subscription to config-file changes. Dropping it stops the watcher.
pub struct ConfigSubscription {
    _watcher: RecommendedWatcher,
    forwarder: JoinHandle<()>,
}

impl ConfigSubscription {
    /// Watch the directories holding `paths` and send
    /// [`HostEvent::ConfigChanged`] when one of those files is created,
    /// written or removed. A burst of file events within `debounce` is
    /// reported once.
    pub fn watch(
        paths: Vec<PathBuf>,
        debounce: Duration,
        events: mpsc::UnboundedSender<HostEvent>,
    ) -> Result<Self> {
        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<()>();
        let names: Vec<OsString> = paths
            .iter()
            .filter_map(|path| path.file_name().map(OsStr::to_os_string))
            .collect();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) if touches(&event, &names) => {
                    let _ = raw_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Config watch error: {e}"),
            },
            notify::Config::default(),
        )?;

        // Parent dirs rather than the files, so a config created later is seen.
        let mut dirs: Vec<&Path> = paths.iter().filter_map(|path| parent_dir(path)).collect();
        dirs.sort();
        dirs.dedup();
        for dir in dirs {
            if dir.is_dir() {
                watcher.watch(dir, RecursiveMode::NonRecursive)?;
                tracing::debug!(dir = %dir.display(), "Watching config directory");
            } else {
                tracing::debug!(dir = %dir.display(), "Config directory missing, not watched");
            }
        }

        let forwarder = tokio::spawn(async move {
            while raw_rx.recv().await.is_some() {
                tokio::time::sleep(debounce).await;
                while raw_rx.try_recv().is_ok() {}
                if events.send(HostEvent::ConfigChanged).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            forwarder,
        })
    }
}

impl Drop for ConfigSubscription {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    match path.parent() {
        Some(dir) if dir.as_os_str().is_empty() => Some(Path::new(".")),
        other => other,
    }
}

/// Whether `event` changes one of the watched file names. Reads are ignored.
fn touches(event: &notify::Event, names: &[OsString]) -> bool {
    !event.kind.is_access()
        && event.paths.iter().any(|path| {
            path.file_name()
                .is_some_and(|name| names.iter().any(|watched| watched == name))
        })
}

/// Activate, then dispatch events until `quit` or end of input.
pub async fn run<C, S, H>(
    orchestrator: &mut SyncOrchestrator<C, S, H>,
    watched: Vec<PathBuf>,
    debounce: Duration,
) -> Result<()>
where
    C: ConfigSource,
    S: IssueSource,
    H: Host,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = match ConfigSubscription::watch(watched, debounce, tx) {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            tracing::warn!(error = %e, "Config changes will not be picked up automatically");
            None
        }
    };

    tracing::info!(grouping = %orchestrator.grouping(), "Session started");
    orchestrator.activate().await;
    output::print_message("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let event = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => match HostEvent::parse(&line) {
                    Some(event) => event,
                    None => {
                        output::print_error(&format!("Unknown command: {}", line.trim()));
                        HostEvent::Help
                    }
                },
                None => HostEvent::Quit,
            },
            Some(event) = rx.recv() => event,
        };

        if dispatch(orchestrator, event).await.is_break() {
            break;
        }
        tracing::debug!(state = ?orchestrator.state(), "Event handled");
    }

    drop(subscription);
    Ok(())
}

async fn dispatch<C, S, H>(
    orchestrator: &mut SyncOrchestrator<C, S, H>,
    event: HostEvent,
) -> ControlFlow<()>
where
    C: ConfigSource,
    S: IssueSource,
    H: Host,
{
    tracing::debug!(?event, "Dispatching host event");
    match event {
        HostEvent::Start => {
            orchestrator.start().await;
        }
        HostEvent::NextPage => {
            orchestrator.next_page().await;
        }
        HostEvent::PrevPage => {
            orchestrator.prev_page().await;
        }
        HostEvent::ToggleGrouping => {
            let mode = orchestrator.toggle_grouping();
            output::print_message(&format!("Grouping by {mode}"));
        }
        HostEvent::ConfigChanged => {
            orchestrator.on_config_changed().await;
        }
        HostEvent::Help => output::print_message(HELP),
        HostEvent::Quit => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_commands() {
        assert_eq!(HostEvent::parse("sync"), Some(HostEvent::Start));
        assert_eq!(HostEvent::parse("  N \n"), Some(HostEvent::NextPage));
        assert_eq!(HostEvent::parse("prev"), Some(HostEvent::PrevPage));
        assert_eq!(HostEvent::parse("toggle"), Some(HostEvent::ToggleGrouping));
        assert_eq!(HostEvent::parse("reload"), Some(HostEvent::ConfigChanged));
        assert_eq!(HostEvent::parse("q"), Some(HostEvent::Quit));
        assert_eq!(HostEvent::parse("frobnicate"), None);
    }

    fn names(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<HostEvent>) -> Option<HostEvent> {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("watcher should report the change")
    }

    #[test]
    fn test_touches_matches_watched_names_only() {
        use notify::event::{AccessKind, CreateKind, ModifyKind};
        use notify::{Event, EventKind};

        let watched = names(&["sonar.json", "settings.toml"]);
        let write = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/ws/sonar.json"));
        let create = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/cfg/settings.toml"));
        let other = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/ws/package.json"));
        let read = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/ws/sonar.json"));

        assert!(touches(&write, &watched));
        assert!(touches(&create, &watched));
        assert!(!touches(&other, &watched));
        assert!(!touches(&read, &watched));
    }

    #[test]
    fn test_relative_config_watches_current_dir() {
        assert_eq!(parent_dir(Path::new("sonar.json")), Some(Path::new(".")));
        assert_eq!(parent_dir(Path::new("/ws/sonar.json")), Some(Path::new("/ws")));
    }

    #[tokio::test]
    async fn test_subscription_reports_new_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sonar.json");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _subscription =
            ConfigSubscription::watch(vec![path.clone()], Duration::from_millis(10), tx).unwrap();
        std::fs::write(&path, r#"{"host":"https://sonar/"}"#).unwrap();

        assert_eq!(next_event(&mut rx).await, Some(HostEvent::ConfigChanged));
    }

    #[tokio::test]
    async fn test_subscription_reports_rewrite_with_unchanged_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sonar.json");
        std::fs::write(&path, r#"{"host":"https://a/"}"#).unwrap();
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _subscription =
            ConfigSubscription::watch(vec![path.clone()], Duration::from_millis(10), tx).unwrap();
        std::fs::write(&path, r#"{"host":"https://b/"}"#).unwrap();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();

        assert_eq!(next_event(&mut rx).await, Some(HostEvent::ConfigChanged));
    }

    #[tokio::test]
    async fn test_unrelated_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _subscription = ConfigSubscription::watch(
            vec![dir.path().join("sonar.json")],
            Duration::from_millis(10),
            tx,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let quiet = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(quiet.is_err());
    }

    #[tokio::test]
    async fn test_dropping_subscription_stops_watcher() {
        let dir = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let subscription = ConfigSubscription::watch(
            vec![dir.path().join("sonar.json")],
            Duration::from_millis(10),
            tx,
        )
        .unwrap();
        drop(subscription);

        let closed = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("channel should close once the watcher is gone");
        assert_eq!(closed, None);
    }
}
