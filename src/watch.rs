use std::error::Error;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use notify::{EventKind, RecursiveMode, Watcher};

/// Editors often save in several steps; wait this long for the burst to end.
const SETTLE: Duration = Duration::from_millis(200);

/// Build once, then rebuild on every change to `config` until the watcher
/// goes away.
pub fn run(config: &Path, out: &Path) -> Result<(), Box<dyn Error>> {
    rebuild(config, out);

    let (tx, rx) = mpsc::channel::<()>();
    let name = config.file_name().map(|n| n.to_owned());
    let mut watcher =
        notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                match event.kind {
                    EventKind::Modify(_)
                    | EventKind::Create(_)
                    | EventKind::Remove(_)
                    | EventKind::Any => {
                        if event.paths.iter().any(|p| p.file_name() == name.as_deref()) {
                            let _ = tx.send(());
                        }
                    }
                    _ => {}
                }
            }
        })?;
    // Watch the folder: replacing the file would drop a watch on the file itself
    let dir = match config.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    log::info!("watching {} for changes", config.display());

    while rx.recv().is_ok() {
        while rx.recv_timeout(SETTLE).is_ok() {}
        rebuild(config, out);
    }
    Ok(())
}

fn rebuild(config: &Path, out: &Path) {
    match crate::build(config, out) {
        Ok(n) => log::info!("rebuilt {} ({n} files)", out.display()),
        Err(e) => log::error!("build failed, keeping the previous pack: {e}"),
    }
}
