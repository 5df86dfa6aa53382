use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use clap::Args;
use spacefs::ProgressFn;
use spacefs_api::fs::FileStatus;

use crate::error::{self, Context};
use crate::formatting::bytes_to_unit;
use crate::path::{metadata, normalize_from};

use super::{Tree, find};

fn cwd() -> error::Result<PathBuf> {
    std::env::current_dir()
        .context("failed to retrieve the current working directory")
}

fn path_basename(fs_path: &Path) -> error::Result<Option<String>> {
    let Some(file_name) = fs_path.file_name() else {
        return Ok(None)
    };

    let rtn = file_name.to_str()
        .context("the provided file contains invalid utf-8 characters in the name")?
        .to_owned();

    Ok(Some(rtn))
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// the local file to upload
    path: PathBuf,

    /// name of the file in the store, defaults to the local file name
    #[arg(long)]
    name: Option<String>,
}

pub async fn upload(tree: &Tree, args: UploadArgs) -> error::Result {
    let full = normalize_from(cwd()?, &args.path);

    let meta = metadata(&full)
        .context("failed to retrieve metadata for file")?
        .context(format!("file not found: \"{}\"", full.display()))?;

    if !meta.is_file() {
        return Err(error::Error::new()
            .context("requested path is not a file"));
    }

    let name = match args.name {
        Some(name) => name,
        None => path_basename(&full)?
            .context("the provided path has no file name")?
    };

    let mime = mime_guess::from_path(&full).first();
    let content = std::fs::read(&full)
        .context("failed to read file")?;

    let entry = tree.upload(&name, mime, Bytes::from(content)).await
        .context(format!("failed to upload \"{name}\""))?;

    if entry.status == FileStatus::Pending {
        println!("uploaded \"{}\" {}, waiting for approval", entry.name, bytes_to_unit(entry.size));
    } else {
        println!("uploaded \"{}\" {}", entry.name, bytes_to_unit(entry.size));
    }

    Ok(())
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// name, display name or id of the file
    target: String,

    /// the output path for the file, a directory keeps the stored name
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn resolve_file_path(given: Option<PathBuf>, filename: &str) -> error::Result<PathBuf> {
    let curr_dir = cwd()?;

    let Some(given) = given else {
        return Ok(curr_dir.join(filename));
    };

    let mut resolved = normalize_from(&curr_dir, given);

    let is_dir = metadata(&resolved)
        .context("failed to resolve the output path")?
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    if is_dir {
        resolved.push(filename);
    }

    Ok(resolved)
}

pub async fn download(tree: &Tree, args: DownloadArgs) -> error::Result {
    let entry = find(tree, &args.target)?;

    if entry.is_folder {
        return Err(error::Error::from(format!("\"{}\" is a folder", entry.name)));
    }

    let output = resolve_file_path(args.output, &entry.name)?;

    let progress: ProgressFn = Arc::new(|percent: u8| {
        let mut stdout = std::io::stdout();

        // progress output is best effort
        let _ = write!(stdout, "\r{percent:>3}%");
        let _ = stdout.flush();
    });

    let content = tree.download(&entry.id, Some(progress)).await
        .context(format!("failed to download \"{}\"", entry.name))?;

    println!();

    std::fs::write(&output, &content)
        .context(format!("failed to write \"{}\"", output.display()))?;

    println!("saved {} to \"{}\"", bytes_to_unit(content.len() as u64), output.display());

    Ok(())
}
