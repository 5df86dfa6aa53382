use std::path::PathBuf;

use clap::{Parser, Subcommand, Args};
use spacefs::{SpaceTree, RemotePort, Entry, Space};
use spacefs::remote::{HttpRemote, MemoryRemote};
use spacefs_api::client::ApiClient;

use crate::config::{self, Settings};
use crate::error::{self, Context};
use crate::formatting;
use crate::input;

mod transfer;

pub type Tree = SpaceTree<Box<dyn RemotePort>>;

/// a shell for browsing and changing files of a spacefs store.
///
/// if no command is provided then it will enter interactive mode.
#[derive(Debug, Parser)]
struct Cli {
    /// a config file to load settings from. can be given more than once,
    /// later files override earlier ones
    #[arg(long)]
    config: Vec<PathBuf>,

    /// host name of server
    ///
    /// will be used in a url so the value must be valid for the hostname part
    /// of a url. examples: example.com | 10.0.0.2 | [fd34::2]
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// port of server
    #[arg(short, long)]
    port: Option<u16>,

    /// to use https
    #[arg(short, long)]
    secure: bool,

    /// bearer token sent with every request
    ///
    /// falls back to the SPACEFS_TOKEN environment variable and then to the
    /// config files
    #[arg(long)]
    token: Option<String>,

    /// space to start in. public | group | users
    #[arg(long)]
    space: Option<Space>,

    /// use a store kept in memory with some example files instead of a
    /// server
    #[arg(long)]
    memory: bool,

    #[command(subcommand)]
    command: Option<BaseCmds>
}

impl Cli {
    fn settings(&self) -> error::Result<Settings> {
        let mut settings = Settings::load(&self.config)?;

        if let Some(host) = &self.host {
            settings.server.host = host.clone();
        }

        if self.port.is_some() {
            settings.server.port = self.port;
        }

        if self.secure {
            settings.server.secure = true;
        }

        if let Some(token) = &self.token {
            settings.token = Some(token.clone());
        } else if let Ok(token) = std::env::var(config::TOKEN_ENV) {
            settings.token = Some(token);
        }

        if let Some(space) = self.space {
            settings.space = space;
        }

        Ok(settings)
    }
}

pub fn start() -> error::Result {
    let args = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create async runtime")?;

    runtime.block_on(run(args))
}

fn build_client(settings: &Settings) -> error::Result<ApiClient> {
    let mut client_builder = ApiClient::builder();
    client_builder.secure(settings.server.secure);
    client_builder.port(settings.server.port);
    client_builder.token(settings.token.clone());

    if !client_builder.host(&settings.server.host) {
        return Err(error::Error::from(format!(
            "cannot set host to the value provided. {}",
            settings.server.host
        )));
    }

    client_builder.build().context("failed to create api client")
}

async fn run(args: Cli) -> error::Result {
    let settings = args.settings()?;

    let remote: Box<dyn RemotePort> = if args.memory {
        tracing::debug!("using in memory store");

        Box::new(MemoryRemote::seeded())
    } else {
        Box::new(HttpRemote::new(build_client(&settings)?))
    };

    let tree = SpaceTree::new(remote, settings.space, settings.labels);

    match args.command {
        Some(cmd) => {
            tree.refresh().await.context("failed to load the space root")?;

            handle(&tree, cmd).await
        },
        None => {
            if let Err(err) = tree.refresh().await {
                println!("failed to load the space root: {err}");
            }

            Interactive::handle(&tree).await
        }
    }
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
enum Interactive {
    #[command(flatten)]
    Base(BaseCmds),

    /// leaves the shell
    #[command(alias = "exit")]
    Quit
}

impl Interactive {
    async fn handle(tree: &Tree) -> error::Result {
        loop {
            let prompt = format!("{}> ", tree.navigation().current_display_path());

            let Some(given) = input::read_line(prompt)? else {
                println!();
                break;
            };

            let trimmed = given.trim();

            if trimmed.is_empty() {
                continue;
            }

            let Ok(args_list) = shell_words::split(trimmed) else {
                println!("failed to parse command line args");
                continue;
            };

            let cmd = match Interactive::try_parse_from(args_list) {
                Ok(c) => c,
                Err(err) => {
                    println!("{}", err);
                    continue;
                }
            };

            let result = match cmd {
                Interactive::Base(cmd) => handle(tree, cmd).await,
                Interactive::Quit => break,
            };

            if let Err(err) = result {
                println!("{}", err);
            }
        }

        Ok(())
    }
}

#[derive(Debug, Subcommand)]
enum BaseCmds {
    /// lists the current directory
    Ls(LsArgs),

    /// reloads the current directory
    Refresh,

    /// opens a folder of the current directory
    Cd {
        /// name, display name or id of the folder. ".." goes up one folder
        /// and "/" to the root of the space
        target: String,
    },

    /// goes up one folder
    Up,

    /// jumps to a folder of the current path, see "pwd" for the indices
    Jump {
        index: usize,
    },

    /// goes to the root of the space
    Root,

    /// shows the current path
    Pwd,

    /// switches to another space. public | group | users
    Space {
        space: Space,
    },

    /// creates a folder in the current directory
    Mkdir {
        name: String,
    },

    /// uploads a local file into the current directory
    Upload(transfer::UploadArgs),

    /// downloads a file of the current directory
    Download(transfer::DownloadArgs),

    /// renames a file or folder of the current directory
    Rename {
        /// name, display name or id of the item
        target: String,

        /// the new name
        name: String,
    },

    /// deletes a file or folder of the current directory
    #[command(alias = "delete")]
    Rm {
        /// name, display name or id of the item
        target: String,

        /// do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// moves a file or folder of the current directory into another folder
    Mv {
        /// name, display name or id of the item
        target: String,

        /// a folder of the current directory or the id of any folder in the
        /// space
        destination: String,
    },
}

#[derive(Debug, Args)]
struct LsArgs {
    /// reloads the directory before printing it
    #[arg(short, long)]
    refresh: bool,
}

async fn handle(tree: &Tree, command: BaseCmds) -> error::Result {
    match command {
        BaseCmds::Ls(given) => ls(tree, given).await,
        BaseCmds::Refresh => {
            tree.refresh().await.context("failed to load directory")?;

            ls(tree, LsArgs { refresh: false }).await
        },
        BaseCmds::Cd { target } => cd(tree, target).await,
        BaseCmds::Up => {
            tree.pop_one().await.context("failed to load directory")?;

            pwd(tree)
        },
        BaseCmds::Jump { index } => {
            tree.navigate_to_index(index).await.context("failed to load directory")?;

            pwd(tree)
        },
        BaseCmds::Root => {
            tree.reset_to_root().await.context("failed to load directory")?;

            pwd(tree)
        },
        BaseCmds::Pwd => pwd(tree),
        BaseCmds::Space { space } => {
            tree.switch_space(space).await.context(format!("failed to switch to {space}"))?;

            pwd(tree)
        },
        BaseCmds::Mkdir { name } => {
            let created = tree.create_folder(&name).await
                .context("failed to create folder")?;

            println!("created folder {} {}", created.name, created.id);

            Ok(())
        },
        BaseCmds::Upload(given) => transfer::upload(tree, given).await,
        BaseCmds::Download(given) => transfer::download(tree, given).await,
        BaseCmds::Rename { target, name } => {
            let entry = find(tree, &target)?;

            let renamed = tree.rename(&entry.id, &name).await
                .context(format!("failed to rename \"{}\"", entry.name))?;

            println!("renamed \"{}\" to \"{}\"", entry.name, renamed.name);

            Ok(())
        },
        BaseCmds::Rm { target, yes } => rm(tree, target, yes).await,
        BaseCmds::Mv { target, destination } => mv(tree, target, destination).await,
    }
}

/// looks up an entry of the current directory
fn find(tree: &Tree, needle: &str) -> error::Result<Entry> {
    tree.find_entry(needle).context(format!(
        "no item named \"{needle}\" in the current directory"
    ))
}

async fn ls(tree: &Tree, args: LsArgs) -> error::Result {
    if args.refresh {
        tree.refresh().await.context("failed to load directory")?;
    }

    let view = tree.view();

    println!("{}", tree.navigation().current_display_path());

    if view.stale {
        println!("listing may be out of date, \"ls -r\" reloads it");
    }

    if let Some(err) = &view.error {
        println!("last error: {err}");
    }

    if view.current_files.is_empty() {
        println!("empty directory");
    } else {
        let mut stdout = std::io::stdout();

        formatting::write_listing(&mut stdout, &view.current_files)
            .context("failed to output to stdout")?;
    }

    Ok(())
}

async fn cd(tree: &Tree, target: String) -> error::Result {
    let result = match target.as_str() {
        ".." => tree.pop_one().await,
        "/" => tree.reset_to_root().await,
        _ => {
            let entry = find(tree, &target)?;

            tree.open_folder(&entry).await
        }
    };

    result.context(format!("failed to open \"{target}\""))?;

    pwd(tree)
}

fn pwd(tree: &Tree) -> error::Result {
    let nav = tree.navigation();

    println!("{}", nav.current_display_path());

    if !nav.is_root() {
        let crumbs: Vec<String> = nav.frames().iter()
            .enumerate()
            .map(|(index, frame)| format!("{index}: {}", frame.display_name()))
            .collect();

        println!("{}", crumbs.join("  "));
    }

    Ok(())
}

async fn rm(tree: &Tree, target: String, yes: bool) -> error::Result {
    let entry = find(tree, &target)?;

    if !yes {
        let what = if entry.is_folder { "folder" } else { "file" };

        if !input::read_yn(format!("delete {what} \"{}\"?", entry.name))? {
            return Ok(());
        }
    }

    tree.delete(&entry.id).await
        .context(format!("failed to delete \"{}\"", entry.name))?;

    println!("deleted \"{}\"", entry.name);

    Ok(())
}

async fn mv(tree: &Tree, target: String, destination: String) -> error::Result {
    let entry = find(tree, &target)?;

    let destination_id = match tree.find_entry(&destination) {
        Some(folder) if folder.is_folder => folder.id,
        Some(_) => {
            return Err(error::Error::from(format!("\"{destination}\" is not a folder")));
        },
        None => destination,
    };

    let moved = tree.move_entry(&entry.id, &destination_id).await
        .context(format!("failed to move \"{}\"", entry.name))?;

    println!("moved \"{}\" into {}", moved.name, destination_id);

    Ok(())
}
