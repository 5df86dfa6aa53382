/// checks that the given string has no control characters and does not start
/// or end with whitespace. when `max_chars` is given the total number of
/// characters must not exceed it.
pub fn check_control_leading_trailing<G>(
    given: G,
    max_chars: Option<usize>
) -> bool
where
    G: AsRef<str>
{
    let given_ref = given.as_ref();
    let mut iter = given_ref.chars();
    let mut char_count = 0;

    if let Some(ch) = iter.next() {
        char_count += 1;

        if ch.is_control() || ch.is_whitespace() {
            return false
        }
    }

    // check for trailing whitespace/control
    if let Some(ch) = iter.next_back() {
        char_count += 1;

        if ch.is_control() || ch.is_whitespace() {
            return false
        }
    }

    for ch in iter {
        if ch.is_control() {
            return false;
        }

        char_count += 1;
    }

    if let Some(max_chars) = max_chars {
        char_count <= max_chars
    } else {
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn check_control_leading_trailing_whitespace_chars() {
        let leading = String::from(" test");
        let trailing = String::from("test ");
        let contains = String::from("test test");

        assert!(!check_control_leading_trailing(leading, None), "leading whitespace characters");
        assert!(!check_control_leading_trailing(trailing, None), "trailing whitespace characters");
        assert!(check_control_leading_trailing(contains, None), "inner whitespace characters");
    }

    #[test]
    pub fn check_control_leading_trailing_control_chars() {
        let trailing = String::from("test\u{0000}");
        let leading = String::from("\u{0000}test");
        let contains = String::from("test\u{0000}test");

        assert!(!check_control_leading_trailing(trailing, None), "trailing control characters");
        assert!(!check_control_leading_trailing(leading, None), "leading control characters");
        assert!(!check_control_leading_trailing(contains, None), "contains control characters");
    }

    #[test]
    pub fn check_control_leading_trailing_max_length() {
        let k = String::from("abcdefghijklmnopqrstuvwxyzA");
        let count = k.chars().count();
        let max = count - 1;

        assert!(!check_control_leading_trailing(&k, Some(max)), "max {} total {}", max, count);
        assert!(check_control_leading_trailing(&k, Some(count)), "max {} total {}", count, count);
    }
}
