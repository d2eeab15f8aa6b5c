#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),     // <text> | /search <text>
    Pages(Option<u32>), // /pages <n> | /pages
    List,               // /list
    Save(usize),        // /save <n>, 1-based
    Xlsx,               // /xlsx
    Help,               // /help
    Quit,               // /quit or /exit
    BadArgument(String),
    Unknown(String),
}

/// Anything not starting with `/` is a search.
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Command::Search(trimmed.to_string());
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match verb {
        "/search" => Command::Search(rest.unwrap_or_default().to_string()),
        "/pages" => match rest {
            None => Command::Pages(None),
            Some(n) => match n.parse::<u32>() {
                Ok(n) => Command::Pages(Some(n)),
                Err(_) => Command::BadArgument(format!("`{n}` is not a page count")),
            },
        },
        "/list" => Command::List,
        "/save" => match rest.map(str::parse::<usize>) {
            Some(Ok(n)) if n > 0 => Command::Save(n),
            Some(_) => Command::BadArgument(format!(
                "`{}` is not a result number",
                rest.unwrap_or_default()
            )),
            None => Command::BadArgument("usage: /save <n>".into()),
        },
        "/xlsx" => Command::Xlsx,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}
