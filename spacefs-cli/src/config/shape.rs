use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub secure: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct Labels {
    pub public: Option<String>,
    pub group: Option<String>,
    pub users: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Option<Server>,

    pub token: Option<String>,
    pub token_file: Option<PathBuf>,

    pub space: Option<String>,
    pub labels: Option<Labels>,
}
