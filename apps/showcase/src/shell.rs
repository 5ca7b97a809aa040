use shared::domain::CategoryId;

pub const HELP: &str = "\
commands:
  type <text>        keystrokes into the search box (debounced)
  search <text>      commit search text immediately
  category <id|all>  filter by category
  sort <token>       created_at_desc, views_desc, title_asc, ...
  page <n>           go to page n
  clear              reset every filter
  random             open a random work
  url                print the current address
  help               show this list
  quit               leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Type(String),
    Search(String),
    Category(Option<CategoryId>),
    Sort(String),
    Page(String),
    Clear,
    Random,
    Url,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parses one input line; blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (verb, rest) = match line.trim_start().split_once(' ') {
            Some((verb, rest)) => (verb, rest),
            None => (line.trim(), ""),
        };
        let command = match verb {
            "" => return Ok(None),
            "type" => ShellCommand::Type(rest.to_string()),
            "search" => ShellCommand::Search(rest.to_string()),
            "category" => match rest.trim() {
                "" | "all" => ShellCommand::Category(None),
                raw => ShellCommand::Category(Some(
                    raw.parse()
                        .map_err(|_| format!("'{raw}' is not a category id"))?,
                )),
            },
            "sort" => ShellCommand::Sort(rest.trim().to_string()),
            "page" => ShellCommand::Page(rest.trim().to_string()),
            "clear" => ShellCommand::Clear,
            "random" => ShellCommand::Random,
            "url" => ShellCommand::Url,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}
