/// Gets the value of an environment variable, treating an empty value as unset.
///
/// # Arguments
///
/// * `key` - The environment variable name to retrieve
///
/// # Returns
///
/// * `Option<String>` - The environment variable value if it exists and isn't blank
pub fn get_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Gets an environment variable and parses it, ignoring values that fail to parse.
pub fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    get_env(key).and_then(|value| value.trim().parse().ok())
}
