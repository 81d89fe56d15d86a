use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::{
    VERSION,
    command::Command,
    matrix::{MatrixCommand, api::MatrixStatus},
    state::CrossbarState,
};

use super::{
    error::{DispatchError, MatrixChannelError},
    model::{Cli, CliCommands, ListItems},
};

#[derive(Serialize)]
struct EntityRow<'a> {
    entity_id: &'a str,
    friendly_name: &'a str,
    output: u8,
    options: &'a [String],
}

#[derive(Serialize)]
struct CardRow<'a> {
    wid: &'a str,
    r#type: &'a str,
    entity: &'a str,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    connected: bool,
    /// last successful poll, null until the first one lands
    status: Option<&'a MatrixStatus>,
}

impl Cli {
    pub async fn dispatch(self, istate: &Arc<CrossbarState>) -> Result<Option<String>, DispatchError> {
        Ok(match self.command {
            CliCommands::Select(args) => {
                let cmd = Command::select_option(args.entity, args.option);
                execute(istate, &cmd)?;
                None
            }
            CliCommands::List(args) => match args.item {
                ListItems::Entities => {
                    let rows: Vec<_> = istate
                        .entities
                        .all
                        .iter()
                        .map(|e| EntityRow {
                            entity_id: &e.entity_id,
                            friendly_name: &e.friendly_name,
                            output: e.output,
                            options: &e.options,
                        })
                        .collect();
                    Some(serde_json::to_string(&rows)?)
                }
                ListItems::Inputs => Some(serde_json::to_string(istate.entities.input_names())?),
                ListItems::Cards => {
                    let rows: Vec<_> = istate
                        .widgets
                        .cards
                        .iter()
                        .map(|w| CardRow {
                            wid: w.wid(),
                            r#type: w.type_name(),
                            entity: w.entity_id(),
                        })
                        .collect();
                    Some(serde_json::to_string(&rows)?)
                }
            },
            CliCommands::Status => {
                let connected = *istate.matrix.connected.lock().await;
                let status = istate.matrix.status.lock().await;
                Some(serde_json::to_string(&StatusReport {
                    connected,
                    status: status.as_ref(),
                })?)
            }
            CliCommands::Refresh => {
                istate
                    .matrix
                    .tx
                    .try_send(MatrixCommand::Refresh)
                    .map_err(MatrixChannelError::from)?;
                None
            }
            CliCommands::Version => Some(serde_json::to_string(&VERSION)?),
        })
    }
}

/// Resolve a select command and hand it to the matrix task.
/// Fire-and-forget: the poll after the switch confirms the change
pub fn execute(istate: &Arc<CrossbarState>, cmd: &Command) -> Result<(), DispatchError> {
    let entity = istate
        .entities
        .get(&cmd.entity_id)
        .ok_or_else(|| DispatchError::UnknownEntity(cmd.entity_id.clone()))?;
    let input = istate
        .entities
        .resolve_option(&cmd.option)
        .ok_or_else(|| DispatchError::UnknownOption(cmd.option.clone()))?;

    info!(
        "{}.{} {} -> `{}`",
        cmd.domain, cmd.action, cmd.entity_id, cmd.option
    );
    istate
        .matrix
        .tx
        .try_send(MatrixCommand::Switch {
            output: entity.output,
            input,
        })
        .map_err(MatrixChannelError::from)?;
    Ok(())
}
