use crate::tui::TuiMsg;
use crossterm::event;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;

const INPUT_POLL: Duration = Duration::from_millis(100);
const TICK: Duration = Duration::from_millis(80);

/// Terminal input and the redraw tick, both stopped by `cancel`.
pub fn spawn_tui_feeders(tx: mpsc::Sender<TuiMsg>, cancel: CancellationToken) {
    let tx_in = tx.clone();
    let cancel_in = cancel.clone();
    tokio::spawn(async move {
        while !cancel_in.is_cancelled() {
            // Bounded poll so the blocking thread never outlives shutdown by long.
            let ev = tokio::task::spawn_blocking(|| -> std::io::Result<Option<event::Event>> {
                if event::poll(INPUT_POLL)? {
                    event::read().map(Some)
                } else {
                    Ok(None)
                }
            })
            .await;
            let msg = match ev {
                Ok(Ok(Some(e))) => TuiMsg::InputEvent(e),
                Ok(Ok(None)) => continue,
                Ok(Err(e)) => TuiMsg::OpError(format!("input: {e}")),
                Err(_) => break,
            };
            if tx_in.send(msg).await.is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        let mut interval = time::interval(TICK);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let _ = tx.try_send(TuiMsg::Tick);
                }
            }
        }
    });
}
