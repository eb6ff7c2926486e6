/// Real name of the OS user, falling back to the login name.
pub fn get_name() -> String {
    let name = whoami::realname();
    if name.trim().is_empty() {
        return whoami::username();
    }
    name
}

pub fn get_author(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => get_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_author_wins() {
        assert_eq!(get_author(Some("  Jane Doe ")), "Jane Doe");
    }

    #[test]
    fn test_blank_author_falls_back() {
        assert_eq!(get_author(Some("   ")), get_name());
        assert_eq!(get_author(None), get_name());
    }
}
