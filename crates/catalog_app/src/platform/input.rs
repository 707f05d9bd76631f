use catalog_core::CatalogItem;

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `filter <class>`; `filter` alone or `any` clears it.
    Filter(Option<String>),
    Refresh,
    More,
    Toggle(RowRef),
    SelectAll,
    ClearSelection,
    ShowSelected,
    ShowClasses,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRef {
    /// 1-based position in the visible list.
    Position(usize),
    /// Full uid, or a prefix matching exactly one visible uid.
    Uid(String),
}

/// Finds the uid of the visible item `row` refers to.
pub fn resolve_row(items: &[CatalogItem], row: &RowRef) -> Result<String, String> {
    match row {
        RowRef::Position(position) => position
            .checked_sub(1)
            .and_then(|index| items.get(index))
            .map(|item| item.uid.clone())
            .ok_or_else(|| format!("no row {position}")),
        RowRef::Uid(uid) => {
            if let Some(item) = items.iter().find(|item| &item.uid == uid) {
                return Ok(item.uid.clone());
            }
            let mut candidates = items.iter().filter(|item| item.uid.starts_with(uid.as_str()));
            match (candidates.next(), candidates.next()) {
                (Some(item), None) => Ok(item.uid.clone()),
                (Some(_), Some(_)) => Err(format!("uid prefix {uid:?} matches several rows")),
                (None, _) => Err(format!("no visible item with uid {uid:?}")),
            }
        }
    }
}

pub const HELP: &str = "\
commands:
  filter <class>   filter by primary class (\"filter\" or \"any\" clears)
  more             load more items
  refresh          reload from the start
  toggle <n|uid>   toggle selection of row n or item uid (a unique prefix will do)
  all | none       select every visible item / clear selection
  selected         list selected items
  classes          list known primary classes
  help | quit";

pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let command = match word.to_ascii_lowercase().as_str() {
        "filter" | "f" => Command::Filter(if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }),
        "any" => Command::Filter(None),
        "refresh" | "r" => Command::Refresh,
        "more" | "m" => Command::More,
        "toggle" | "t" => {
            if rest.is_empty() {
                return Err("toggle needs a row number or uid".to_string());
            }
            match rest.trim_start_matches('#').parse::<usize>() {
                Ok(0) => return Err("rows are numbered from 1".to_string()),
                Ok(position) => Command::Toggle(RowRef::Position(position)),
                Err(_) => Command::Toggle(RowRef::Uid(rest.to_string())),
            }
        }
        "all" => Command::SelectAll,
        "none" => Command::ClearSelection,
        "selected" | "s" => Command::ShowSelected,
        "classes" | "c" => Command::ShowClasses,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command {other:?}, try \"help\"")),
    };
    Ok(Some(command))
}
