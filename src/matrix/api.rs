use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::config::MatrixConfig;

pub const API_ENDPOINT: &str = "/cgi-bin/instr";
pub const CMD_LOGIN: &str = "login";
pub const CMD_GET_STATUS: &str = "get video status";
pub const CMD_VIDEO_SWITCH: &str = "video switch";

pub const NUM_INPUTS: u8 = 8;
pub const NUM_OUTPUTS: u8 = 8;

#[derive(Error, Debug)]
pub enum MatrixApiError {
    #[error("http error `{0}`")]
    Http(String),
    #[error("bad status payload `{0}`")]
    BadStatus(String),
    #[error("matrix rejected credentials")]
    AuthRejected,
    #[error("matrix refused command `{comhead}` (result {result:?})")]
    CommandRefused { comhead: String, result: Option<i64> },
    #[error("output must be between 1 and {NUM_OUTPUTS} (got {0})")]
    OutputOutOfRange(u8),
    #[error("input must be between 1 and {NUM_INPUTS} (got {0})")]
    InputOutOfRange(u8),
}

impl From<reqwest::Error> for MatrixApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}

impl From<serde_json::Error> for MatrixApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::BadStatus(value.to_string())
    }
}

/// Status reported by `get video status`, trimmed to the fields we read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixStatus {
    pub power: i64,
    /// output number - 1 -> routed input number
    pub source_mapping: Vec<i64>,
    pub input_names: Vec<String>,
    pub output_names: Vec<String>,
    pub preset_names: Vec<String>,
}

/// Wire shape. The matrix appends a trailing 0 to `allsource`
#[derive(Debug, Deserialize)]
struct RawStatus {
    #[serde(default)]
    power: i64,
    #[serde(default)]
    allsource: Vec<i64>,
    #[serde(default)]
    allinputname: Vec<String>,
    #[serde(default)]
    alloutputname: Vec<String>,
    #[serde(default)]
    allname: Vec<String>,
}

impl MatrixStatus {
    fn from_response(resp: Value) -> Result<Self, MatrixApiError> {
        let mut raw: RawStatus = serde_json::from_value(resp)?;
        if raw.allsource.len() >= NUM_OUTPUTS as usize {
            raw.allsource.truncate(NUM_OUTPUTS as usize);
        }
        Ok(Self {
            power: raw.power,
            source_mapping: raw.allsource,
            input_names: raw.allinputname,
            output_names: raw.alloutputname,
            preset_names: raw.allname,
        })
    }
}

pub struct MatrixApi {
    url: String,
    username: String,
    password: String,
    client: reqwest::Client,
    authenticated: bool,
}

impl MatrixApi {
    pub fn new(cfg: &MatrixConfig) -> Result<Self, MatrixApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout))
            .build()?;
        Ok(Self {
            url: format!("http://{}{API_ENDPOINT}", cfg.host),
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            client,
            authenticated: false,
        })
    }

    async fn request(&self, body: &Value) -> Result<Value, MatrixApiError> {
        debug!("POST {} {body}", self.url);
        let resp = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    pub async fn login(&mut self) -> Result<(), MatrixApiError> {
        let resp = self
            .request(&login_body(&self.username, &self.password))
            .await?;
        let res = login_result(&resp);
        self.authenticated = res.is_ok();
        res
    }

    async fn ensure_login(&mut self) -> Result<(), MatrixApiError> {
        if !self.authenticated {
            self.login().await?;
        }
        Ok(())
    }

    pub async fn status(&mut self) -> Result<MatrixStatus, MatrixApiError> {
        self.ensure_login().await?;
        let resp = self.request(&status_body()).await?;
        MatrixStatus::from_response(resp)
    }

    /// Routes `input` to `output`. The matrix acks with result=1
    pub async fn video_switch(&mut self, output: u8, input: u8) -> Result<(), MatrixApiError> {
        check_ports(output, input)?;
        self.ensure_login().await?;
        let resp = self.request(&switch_body(output, input)).await?;
        if !result_ok(&resp) {
            return Err(MatrixApiError::CommandRefused {
                comhead: CMD_VIDEO_SWITCH.to_string(),
                result: resp.get("result").and_then(Value::as_i64),
            });
        }
        Ok(())
    }
}

fn result_ok(resp: &Value) -> bool {
    resp.get("result").and_then(Value::as_i64) == Some(1)
}

fn login_result(resp: &Value) -> Result<(), MatrixApiError> {
    if !result_ok(resp) {
        return Err(MatrixApiError::AuthRejected);
    }
    Ok(())
}

fn check_ports(output: u8, input: u8) -> Result<(), MatrixApiError> {
    if output < 1 || output > NUM_OUTPUTS {
        return Err(MatrixApiError::OutputOutOfRange(output));
    }
    if input < 1 || input > NUM_INPUTS {
        return Err(MatrixApiError::InputOutOfRange(input));
    }
    Ok(())
}

fn login_body(username: &str, password: &str) -> Value {
    json!({
        "comhead": CMD_LOGIN,
        "user": username,
        "password": password,
    })
}

fn status_body() -> Value {
    json!({
        "comhead": CMD_GET_STATUS,
        "language": 0,
    })
}

fn switch_body(output: u8, input: u8) -> Value {
    json!({
        "comhead": CMD_VIDEO_SWITCH,
        "language": 0,
        "source": [output, input],
    })
}
