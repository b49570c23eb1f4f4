//! Parsing of shell input lines.
//!
//! A line is split into words (double quotes group words containing
//! spaces) and matched against the command table. Names are kept as typed;
//! turning them into paths needs the current listing and happens in the
//! shell.

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A blank line.
    Empty,
    List,
    /// `cd <path>`; `..` is the parent and `~` the home directory.
    ChangeDir(String),
    Back,
    Home,
    Refresh,
    Select(Vec<String>),
    Deselect(Vec<String>),
    SelectAll,
    SelectNone,
    Copy,
    Cut,
    Paste,
    /// `rm [names...]`; no names means the selection.
    Remove(Vec<String>),
    Rename { from: String, to: String },
    MakeDir(String),
    Touch(String),
    Status,
    Help,
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unterminated quote")]
    UnterminatedQuote,
}

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  ls                   list the current directory
  cd <path|..|~>       open a directory
  back                 go back in history
  home                 open the home directory
  refresh              re-list the current directory
  select <names...>    add entries to the selection
  deselect <names...>  remove entries from the selection
  all                  select everything (again: select nothing)
  none                 clear the selection
  copy | cut           stage the selection
  paste                paste the stage here
  rm [names...]        delete names, or the selection
  mv <name> <new>      rename an entry
  mkdir <name>         create a folder
  touch <name>         create an empty file
  status               show location, selection and clipboard
  help                 show this text
  quit                 leave";

/// Parses one line of input.
pub fn parse_line(line: &str) -> Result<Input, ParseError> {
    let words = split_words(line)?;
    let Some((command, args)) = words.split_first() else {
        return Ok(Input::Empty);
    };

    let input = match (command.as_str(), args) {
        ("ls", []) => Input::List,
        ("cd", [path]) => Input::ChangeDir(path.clone()),
        ("cd", _) => return Err(ParseError::Usage("cd <path|..|~>")),
        ("back", []) => Input::Back,
        ("home", []) => Input::Home,
        ("refresh", []) => Input::Refresh,
        ("select", names) if !names.is_empty() => Input::Select(names.to_vec()),
        ("select", _) => return Err(ParseError::Usage("select <names...>")),
        ("deselect", names) if !names.is_empty() => Input::Deselect(names.to_vec()),
        ("deselect", _) => return Err(ParseError::Usage("deselect <names...>")),
        ("all", []) => Input::SelectAll,
        ("none", []) => Input::SelectNone,
        ("copy", []) => Input::Copy,
        ("cut", []) => Input::Cut,
        ("paste", []) => Input::Paste,
        ("rm", names) => Input::Remove(names.to_vec()),
        ("mv", [from, to]) => Input::Rename {
            from: from.clone(),
            to: to.clone(),
        },
        ("mv", _) => return Err(ParseError::Usage("mv <name> <new-name>")),
        ("mkdir", [name]) => Input::MakeDir(name.clone()),
        ("mkdir", _) => return Err(ParseError::Usage("mkdir <name>")),
        ("touch", [name]) => Input::Touch(name.clone()),
        ("touch", _) => return Err(ParseError::Usage("touch <name>")),
        ("status", []) => Input::Status,
        ("help" | "?", []) => Input::Help,
        ("quit" | "exit" | "q", []) => Input::Quit,
        (
            "ls" | "back" | "home" | "refresh" | "all" | "none" | "copy" | "cut" | "paste"
            | "status" | "help" | "?" | "quit" | "exit" | "q",
            _,
        ) => return Err(ParseError::Usage("this command takes no arguments")),
        (other, _) => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(input)
}

/// Splits on whitespace, treating `"..."` as one word.
fn split_words(line: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_quotes {
        return Err(ParseError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
