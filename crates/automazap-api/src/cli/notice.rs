//! Rendering of notices emitted by the store and services.

use console::style;
use tokio::sync::broadcast;
use tracing::debug;

use automazap_types::event::{AppEvent, Notice, NoticeLevel};

/// One-line styled rendering of a notice.
pub fn format_notice(notice: &Notice) -> String {
    let marker = match notice.level {
        NoticeLevel::Success => style("✓").green().bold(),
        NoticeLevel::Info => style("i").blue().bold(),
        NoticeLevel::Error => style("✗").red().bold(),
    };
    match &notice.description {
        Some(description) => format!(
            "  {} {} {}",
            marker,
            style(&notice.title).bold(),
            style(description).dim()
        ),
        None => format!("  {} {}", marker, style(&notice.title).bold()),
    }
}

/// Print every notice already queued on `rx`. Other events are skipped.
pub fn flush_notices(rx: &mut broadcast::Receiver<AppEvent>, show: bool) {
    loop {
        match rx.try_recv() {
            Ok(AppEvent::Notice(notice)) => {
                if show {
                    println!("{}", format_notice(&notice));
                }
            }
            Ok(AppEvent::Navigate { path }) => debug!(%path, "Navigation requested"),
            Ok(_) => {}
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                debug!(skipped, "Notice receiver lagged");
            }
            Err(_) => break,
        }
    }
}
