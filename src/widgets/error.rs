use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum WidgetsInitError {
    #[error("unknown widget type `{0}`")]
    UnknownType(String),
    #[error("widget config is missing required `entity`")]
    MissingEntity,
}
