use std::io::Write;

/// prints `prompt` and reads one line from stdin. `None` once stdin is
/// closed.
pub fn read_line<P>(prompt: P) -> std::io::Result<Option<String>>
where
    P: AsRef<str>
{
    let mut stdout = std::io::stdout();
    let mut buffer = String::new();

    stdout.write_all(prompt.as_ref().as_bytes())?;
    stdout.flush()?;

    if std::io::stdin().read_line(&mut buffer)? == 0 {
        Ok(None)
    } else {
        Ok(Some(buffer))
    }
}

pub fn read_yn<P>(prefix: P) -> std::io::Result<bool>
where
    P: std::fmt::Display
{
    let Some(given) = read_line(format!("{} [y|n]: ", prefix))? else {
        return Ok(false);
    };

    Ok(given.trim()
        .chars()
        .next()
        .map(|first| first.to_ascii_lowercase() == 'y')
        .unwrap_or(false))
}
