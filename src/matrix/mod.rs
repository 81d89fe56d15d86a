pub mod api;

use api::{MatrixApi, MatrixStatus};
use tokio::{
    sync::mpsc,
    time::{Duration, MissedTickBehavior, interval},
};
use tracing::{Instrument, Level, debug, error, info, span};

use crate::config::MatrixConfig;

/// Commands forwarded to the matrix over HTTP
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixCommand {
    Switch { output: u8, input: u8 },
    Refresh,
}

/// Updates flowing back from the poll loop
#[derive(Debug)]
pub enum MatrixEvent {
    Status(MatrixStatus),
    Connected(bool),
}

pub fn spawn(cfg: MatrixConfig) -> (mpsc::Sender<MatrixCommand>, mpsc::Receiver<MatrixEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(5); //FIXME size?
    let (event_tx, event_rx) = mpsc::channel(10);
    let span = span!(Level::INFO, "Matrix", host = %cfg.host);
    tokio::spawn(task(cfg, cmd_rx, event_tx).instrument(span));
    (cmd_tx, event_rx)
}

/// Polls `get video status` every `update_interval` seconds and
/// forwards switch commands, polling again right after each switch
async fn task(
    cfg: MatrixConfig,
    mut cmd_rx: mpsc::Receiver<MatrixCommand>,
    event_tx: mpsc::Sender<MatrixEvent>,
) {
    info!("initializing");

    let mut api = match MatrixApi::new(&cfg) {
        Ok(api) => api,
        Err(e) => {
            error!("creating client: {e}");
            return;
        }
    };

    let mut connected = false;
    let mut ticker = interval(Duration::from_secs(cfg.update_interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                poll(&mut api, &event_tx, &mut connected).await;
            }

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    debug!("command channel closed");
                    return;
                };
                match cmd {
                    MatrixCommand::Switch { output, input } => {
                        match api.video_switch(output, input).await {
                            Ok(()) => {
                                info!("output {output} -> input {input}");
                                poll(&mut api, &event_tx, &mut connected).await;
                            }
                            Err(e) => error!("switching output {output} to input {input}: {e}"),
                        }
                    }
                    MatrixCommand::Refresh => {
                        poll(&mut api, &event_tx, &mut connected).await;
                    }
                }
            }
        }
    }
}

async fn poll(api: &mut MatrixApi, event_tx: &mpsc::Sender<MatrixEvent>, connected: &mut bool) {
    match api.status().await {
        Ok(status) => {
            if !*connected {
                *connected = true;
                send_event(event_tx, MatrixEvent::Connected(true)).await;
            }
            send_event(event_tx, MatrixEvent::Status(status)).await;
        }
        Err(e) => {
            error!("polling status: {e}");
            if *connected {
                *connected = false;
                send_event(event_tx, MatrixEvent::Connected(false)).await;
            }
        }
    }
}

async fn send_event(event_tx: &mpsc::Sender<MatrixEvent>, event: MatrixEvent) {
    if let Err(e) = event_tx.send(event).await {
        error!("sending event: {e}");
    }
}
