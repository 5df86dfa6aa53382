use std::path::{Path, PathBuf};
use std::fmt::{Display, Formatter};

use spacefs::{DisplayNames, Space};

use crate::error::{self, Context};
use crate::path::{metadata, normalize_from};

mod shape;

/// environment variable checked for a bearer token
pub const TOKEN_ENV: &str = "SPACEFS_TOKEN";

#[derive(Debug)]
pub struct Settings {
    pub server: Server,
    pub token: Option<String>,
    pub space: Space,
    pub labels: DisplayNames,
}

impl Settings {
    /// loads the given config files in order, later files override earlier
    /// ones
    pub fn load(paths: &[PathBuf]) -> error::Result<Self> {
        let cwd = std::env::current_dir()
            .context("failed to retrieve cwd for Settings")?;
        let mut settings = Settings::default();

        for config_path in paths {
            let full = normalize_from(&cwd, config_path);

            tracing::debug!("loading config file \"{}\"", full.display());

            let loaded = load_file(&full)?;
            let src = SrcFile::new(&full)?;
            let dot = DotPath::new(&"settings");

            settings.merge(&src, dot, loaded)?;
        }

        tracing::debug!("{settings:#?}");

        Ok(settings)
    }

    fn merge(&mut self, src: &SrcFile<'_>, dot: DotPath<'_>, settings: shape::Settings) -> error::Result<()> {
        if let Some(server) = settings.server {
            self.server.merge(src, dot.push(&"server"), server)?;
        }

        if let Some(token_file) = settings.token_file {
            let full = normalize_from(src.parent, token_file);
            let contents = std::fs::read_to_string(&full).context(format!(
                "{} failed to read \"{}\" in: {src}", dot.push(&"token_file"), full.display()
            ))?;

            self.token = Some(contents.trim().to_owned());
        }

        if let Some(token) = settings.token {
            self.token = Some(token);
        }

        if let Some(space) = settings.space {
            self.space = space.parse::<Space>().context(format!(
                "{} is invalid in: {src}", dot.push(&"space")
            ))?;
        }

        if let Some(labels) = settings.labels {
            let pairs = [
                (Space::Public.key(), labels.public),
                (Space::Group.key(), labels.group),
                (Space::Users.key(), labels.users),
            ];

            for (key, label) in pairs {
                if let Some(label) = label {
                    self.labels.set(key, label);
                }
            }
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: Server::default(),
            token: None,
            space: Space::default(),
            labels: DisplayNames::default(),
        }
    }
}

#[derive(Debug)]
pub struct Server {
    pub host: String,
    pub port: Option<u16>,
    pub secure: bool,
}

impl Server {
    fn merge(&mut self, src: &SrcFile<'_>, dot: DotPath<'_>, server: shape::Server) -> error::Result<()> {
        if let Some(host) = server.host {
            let trimmed = host.trim();

            if trimmed.is_empty() {
                return Err(error::Error::new().context(format!(
                    "{} is empty in: {src}", dot.push(&"host")
                )));
            }

            self.host = trimmed.to_owned();
        }

        if let Some(port) = server.port {
            self.port = Some(port);
        }

        if let Some(secure) = server.secure {
            self.secure = secure;
        }

        Ok(())
    }
}

impl Default for Server {
    fn default() -> Self {
        Server {
            host: String::from("localhost"),
            port: Some(8000),
            secure: false,
        }
    }
}

fn load_file(path: &Path) -> error::Result<shape::Settings> {
    let ext = path.extension().context(format!(
        "failed to retrieve the file extension for config file: \"{}\"", path.display()
    ))?;

    if metadata(path)
        .context(format!("failed to retrieve metadata for config file: \"{}\"", path.display()))?
        .is_none()
    {
        return Err(error::Error::new().context(format!(
            "config file not found: \"{}\"", path.display()
        )));
    }

    let ext = ext.to_ascii_lowercase();
    let file = std::fs::OpenOptions::new()
        .read(true)
        .open(path)
        .context(format!("failed to open config file: \"{}\"", path.display()))?;
    let reader = std::io::BufReader::new(file);

    if ext.eq("yaml") || ext.eq("yml") {
        serde_yaml::from_reader(reader).context(format!(
            "failed to parse yaml config file: \"{}\"", path.display()
        ))
    } else if ext.eq("json") {
        serde_json::from_reader(reader).context(format!(
            "failed to parse json config file: \"{}\"", path.display()
        ))
    } else {
        Err(error::Error::new().context(format!(
            "unknown type of config file: \"{}\"", path.display()
        )))
    }
}

struct SrcFile<'a> {
    parent: &'a Path,
    src: &'a Path,
}

impl<'a> SrcFile<'a> {
    fn new(src: &'a Path) -> error::Result<Self> {
        let parent = src.parent().context(format!(
            "failed to retrieve parent path from source file \"{}\"", src.display()
        ))?;

        Ok(SrcFile {
            parent,
            src
        })
    }
}

impl<'a> Display for SrcFile<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.src.display())
    }
}

struct DotPath<'a>(Vec<&'a dyn Display>);

impl<'a> DotPath<'a> {
    fn new(name: &'a (dyn Display)) -> Self {
        DotPath(vec![name])
    }

    fn push(&self, name: &'a (dyn Display)) -> Self {
        let mut path = self.0.clone();
        path.push(name);

        DotPath(path)
    }
}

impl<'a> Display for DotPath<'a> {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, name) in self.0.iter().enumerate() {
            if index == 0 {
                write!(fmt, "{name}")?;
            } else {
                write!(fmt, ".{name}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn merge_json(settings: &mut Settings, json: &str) -> error::Result<()> {
        let loaded: shape::Settings = serde_json::from_str(json).unwrap();
        let path = PathBuf::from("/tmp/spacefs.json");
        let src = SrcFile::new(&path)?;

        settings.merge(&src, DotPath::new(&"settings"), loaded)
    }

    #[test]
    fn json_overrides_defaults() {
        let mut settings = Settings::default();

        merge_json(&mut settings, r#"{
            "server": { "host": "files.example.com", "secure": true },
            "token": "abc",
            "space": "group",
            "labels": { "users": "Home" }
        }"#).unwrap();

        assert_eq!(settings.server.host, "files.example.com");
        assert_eq!(settings.server.port, Some(8000));
        assert!(settings.server.secure);
        assert_eq!(settings.token.as_deref(), Some("abc"));
        assert_eq!(settings.space, Space::Group);
        assert_eq!(settings.labels.space_label(Space::Users), "Home");
        assert_eq!(settings.labels.space_label(Space::Public), "Public Space");
    }

    #[test]
    fn yaml_shape() {
        let loaded: shape::Settings = serde_yaml::from_str(
            "server:\n  port: 9000\nspace: personal\nlabels:\n  group: Team\n"
        ).unwrap();
        let mut settings = Settings::default();
        let path = PathBuf::from("/tmp/spacefs.yaml");
        let src = SrcFile::new(&path).unwrap();

        settings.merge(&src, DotPath::new(&"settings"), loaded).unwrap();

        assert_eq!(settings.server.port, Some(9000));
        assert_eq!(settings.space, Space::Users);
        assert_eq!(settings.labels.space_label(Space::Group), "Team");
        assert_eq!(settings.labels.space_label(Space::Users), "My Space");
    }

    #[test]
    fn invalid_values() {
        let mut settings = Settings::default();

        let err = merge_json(&mut settings, r#"{ "space": "shared" }"#).unwrap_err();
        assert!(err.to_string().starts_with("settings.space is invalid"), "unexpected error {}", err);

        let err = merge_json(&mut settings, r#"{ "server": { "host": "  " } }"#).unwrap_err();
        assert!(err.to_string().starts_with("settings.server.host is empty"), "unexpected error {}", err);
    }
}
