/// Look up a single cookie value in a `name=value; other=value` string.
///
/// Values are percent-decoded. Returns `None` when the string is empty or no
/// pair carries `name`.
pub fn get_cookie(cookies: &str, name: &str) -> Option<String> {
    if cookies.trim().is_empty() {
        return None;
    }
    let prefix = format!("{name}=");
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .map(|raw| {
            urlencoding::decode(raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
}
