use crate::validation::check_control_leading_trailing;

pub const MAX_NAME_CHARS: usize = 255;

fn valid_name_char(ch: &char) -> bool {
    !matches!(ch, '/' | '\\')
}

/// checks a file or folder name before it is sent to the store.
///
/// names are 1 to 255 characters, carry no path separators or control
/// characters and do not start or end with whitespace. `.` and `..` are
/// rejected since they would be read as navigation by most clients.
pub fn name_valid<N>(given: N) -> bool
where
    N: AsRef<str>
{
    let given = given.as_ref();

    if given.is_empty() || given == "." || given == ".." {
        return false;
    }

    given.chars().all(|ch| valid_name_char(&ch)) &&
        check_control_leading_trailing(given, Some(MAX_NAME_CHARS))
}
