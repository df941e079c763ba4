//! Browse posts interactively, one "load more" at a time

use anyhow::Result;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::list::format_summary;
use crate::client::ContentSource;
use crate::error::ContentError;
use crate::i18n::Locale;
use crate::pagination::ListingController;
use crate::Site;

/// Browse from the terminal. Ctrl-C ends the session and aborts any
/// fetch still in flight.
pub async fn run(site: &Site) -> Result<()> {
    let client = site.client()?;

    let session = CancellationToken::new();
    let on_ctrl_c = session.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    browse(site, &client, stdin_lines(), &mut stdout, session).await
}

/// Read stdin lines on a plain thread. The thread is never joined, so a
/// read still blocked when the session ends does not hold up exit.
fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run a browsing session over `input` lines until it is exhausted,
/// quit, or `session` is cancelled
pub async fn browse<S, W>(
    site: &Site,
    source: &S,
    mut input: mpsc::Receiver<String>,
    out: &mut W,
    session: CancellationToken,
) -> Result<()>
where
    S: ContentSource + ?Sized,
    W: Write,
{
    let locale = Locale::from_tag(&site.config.language);

    let first_page = tokio::select! {
        biased;
        _ = session.cancelled() => return Ok(()),
        page = source.first_page(site.config.page_size) => page?,
    };
    let mut controller = ListingController::with_cancellation(first_page, &session);

    for summary in controller.summaries() {
        writeln!(out, "{}", format_summary(summary, locale))?;
    }

    loop {
        if !controller.can_load_more() {
            writeln!(out, "-- end --")?;
            break;
        }

        write!(out, "[Enter] {} / [q] quit: ", locale.load_more())?;
        out.flush()?;

        let line = tokio::select! {
            biased;
            _ = session.cancelled() => break,
            line = input.recv() => line,
        };
        match line {
            None => break,
            Some(l) if l.trim().eq_ignore_ascii_case("q") => break,
            Some(_) => {}
        }

        let shown = controller.summaries().len();
        match controller.load_more(source).await {
            Ok(_) => {
                for summary in &controller.summaries()[shown..] {
                    writeln!(out, "{}", format_summary(summary, locale))?;
                }
            }
            Err(ContentError::Cancelled) => break,
            Err(e) => {
                writeln!(out, "Could not load more posts: {} (Enter retries)", e)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::list::tests::ThreePages;
    use crate::config::SiteConfig;
    use std::time::Duration;

    fn site() -> Site {
        Site::with_config(std::env::temp_dir(), SiteConfig::default())
    }

    /// Input that ends after `lines`
    fn typed(lines: &[&str]) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            tx.try_send(line.to_string()).unwrap();
        }
        rx
    }

    #[tokio::test]
    async fn test_enter_loads_until_exhausted() {
        let mut out = Vec::new();
        let input = typed(&["", "", ""]);
        browse(&site(), &ThreePages, input, &mut out, CancellationToken::new())
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[a]") && out.contains("[b]") && out.contains("[c]"));
        assert!(out.ends_with("-- end --\n"));
    }

    #[tokio::test]
    async fn test_quit_stops_loading() {
        let mut out = Vec::new();
        browse(&site(), &ThreePages, typed(&["q"]), &mut out, CancellationToken::new())
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[a]"));
        assert!(!out.contains("[b]"));
    }

    #[tokio::test]
    async fn test_end_of_input_stops_loading() {
        let mut out = Vec::new();
        browse(&site(), &ThreePages, typed(&[]), &mut out, CancellationToken::new())
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[a]"));
        assert!(!out.contains("[b]"));
    }

    #[tokio::test]
    async fn test_cancelled_session_exits() {
        let session = CancellationToken::new();
        session.cancel();
        let mut out = Vec::new();
        browse(&site(), &ThreePages, typed(&[""]), &mut out, session)
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_input() {
        // the sender stays alive, so input never arrives
        let (_tx, rx) = mpsc::channel::<String>(1);
        let session = CancellationToken::new();
        let cancel = session.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let mut out = Vec::new();
        tokio::time::timeout(
            Duration::from_secs(1),
            browse(&site(), &ThreePages, rx, &mut out, session),
        )
        .await
        .expect("browse returns once the session is cancelled")
        .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[a]"));
        assert!(!out.contains("[b]"));
    }
}
