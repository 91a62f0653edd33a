//! Line-oriented command surface over a [`Session`].

use crate::error::{PokedexError, PokedexResult};
use crate::fetcher::FetchOutcome;
use crate::models::PAGE_SIZE_OPTIONS;
use crate::mutation::ToggleOutcome;
use crate::session::Session;
use crate::type_catalog::TypeCatalogState;
use crate::view::{type_options, ListStatus, PaginationView, PokemonRow, ALL_TYPES_LABEL};
use std::fmt::Write;

pub const HELP_TEXT: &str = "\
Commands:
  next              go to the next page
  prev              go to the previous page
  page <n>          jump to page n
  size <5|10|20>    change the page size
  filter [type]     filter by type; no type (or 'all') clears the filter
  sort              flip ascending/descending order by number
  toggle <number>   select or deselect a Pokémon
  types             list the available types
  show              print the current page
  help              print this text
  quit              leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    Page(u32),
    Size(u32),
    Filter(String),
    Sort,
    Toggle(u32),
    Types,
    Show,
    Help,
    Quit,
}

/// What the caller should do after a command ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> PokedexResult<Self> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Err(PokedexError::InvalidCommand("empty command".to_string()));
        };
        let rest: Vec<&str> = parts.collect();

        let command = match verb.to_ascii_lowercase().as_str() {
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "page" => Command::Page(number_arg(verb, &rest)?),
            "size" => {
                let size = number_arg(verb, &rest)?;
                if !PAGE_SIZE_OPTIONS.contains(&size) {
                    return Err(PokedexError::InvalidCommand(format!(
                        "page size must be one of {:?}",
                        PAGE_SIZE_OPTIONS
                    )));
                }
                Command::Size(size)
            }
            "filter" => {
                let value = rest.join(" ");
                if value.eq_ignore_ascii_case(ALL_TYPES_LABEL) {
                    Command::Filter(String::new())
                } else {
                    Command::Filter(value.to_lowercase())
                }
            }
            "sort" => Command::Sort,
            "toggle" | "t" => Command::Toggle(number_arg(verb, &rest)?),
            "types" => Command::Types,
            "show" | "ls" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                return Err(PokedexError::InvalidCommand(format!(
                    "unknown command '{}'",
                    other
                )))
            }
        };

        Ok(command)
    }
}

fn number_arg(verb: &str, rest: &[&str]) -> PokedexResult<u32> {
    match rest {
        [value] => value.parse::<u32>().map_err(|_| {
            PokedexError::InvalidCommand(format!("'{}' expects a number, got '{}'", verb, value))
        }),
        _ => Err(PokedexError::InvalidCommand(format!(
            "'{}' expects exactly one number",
            verb
        ))),
    }
}

/// Run a command against the session and render the result
pub async fn execute(session: &Session, command: Command) -> PokedexResult<Reply> {
    let text = match command {
        Command::Quit => return Ok(Reply::Quit),
        Command::Help => HELP_TEXT.to_string(),
        Command::Show => render_catalog(session)?,
        Command::Types => render_types(&session.load_types().await?),
        Command::Next => match session.next_page().await? {
            Some(outcome) => after_fetch(session, &outcome)?,
            None => "Already on the last page.".to_string(),
        },
        Command::Prev => match session.previous_page().await? {
            Some(outcome) => after_fetch(session, &outcome)?,
            None => "Already on the first page.".to_string(),
        },
        Command::Page(page) => {
            let outcome = session.set_page(page).await?;
            after_fetch(session, &outcome)?
        }
        Command::Size(size) => {
            let outcome = session.set_page_size(size).await?;
            after_fetch(session, &outcome)?
        }
        Command::Filter(type_filter) => {
            let outcome = session.set_type_filter(&type_filter).await?;
            after_fetch(session, &outcome)?
        }
        Command::Sort => {
            let outcome = session.toggle_sort_order().await?;
            after_fetch(session, &outcome)?
        }
        Command::Toggle(number) => {
            let outcome = session.toggle(number).await?;
            render_toggle(number, outcome)
        }
    };

    Ok(Reply::Text(text))
}

fn after_fetch(session: &Session, outcome: &FetchOutcome) -> PokedexResult<String> {
    match outcome {
        // A newer request owns the screen; it will render when it lands
        FetchOutcome::Stale { .. } => Ok(String::new()),
        _ => render_catalog(session),
    }
}

fn render_toggle(number: u32, outcome: ToggleOutcome) -> String {
    match outcome {
        ToggleOutcome::RolledBack { error } => {
            format!("Could not toggle #{}: {}", number, error)
        }
        other => match other.into_result(number) {
            Ok(Some(true)) => format!("#{} selected.", number),
            Ok(_) => format!("#{} deselected.", number),
            Err(e) => e.to_string(),
        },
    }
}

/// Table, status line and pagination for the current state
pub fn render_catalog(session: &Session) -> PokedexResult<String> {
    let query = session.query()?;
    let status = session.list_status()?;
    let pagination = session.pagination()?;

    let mut out = String::new();
    let filter = if query.type_filter.is_empty() {
        ALL_TYPES_LABEL.to_string()
    } else {
        query.type_filter.clone()
    };
    let _ = writeln!(
        out,
        "Type: {} | Sort: {} {}",
        filter, query.sort_field, query.sort_order
    );

    match &status {
        ListStatus::Rows(rows) => render_rows(&mut out, rows),
        other => {
            let _ = writeln!(out, "{}", other.message().unwrap_or_default());
        }
    }

    render_pagination(&mut out, &pagination);
    Ok(out)
}

fn render_rows(out: &mut String, rows: &[PokemonRow]) {
    let _ = writeln!(
        out,
        "{:<4} {:>4}  {:<12} {:<9} {:<9} {:>5} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}  {}",
        "Sel", "#", "Name", "Type 1", "Type 2", "Total", "HP", "Atk", "Def", "SpA", "SpD", "Spe", "Gen", "Legendary"
    );
    for row in rows {
        let marker = match (row.pending, row.selected) {
            (true, true) => "[+]",
            (true, false) => "[-]",
            (false, true) => "[x]",
            (false, false) => "[ ]",
        };
        let _ = writeln!(
            out,
            "{:<4} {:>4}  {:<12} {:<9} {:<9} {:>5} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}  {}",
            marker,
            row.number,
            row.name,
            row.type_one,
            row.type_two,
            row.total,
            row.hit_points,
            row.attack,
            row.defense,
            row.special_attack,
            row.special_defense,
            row.speed,
            row.generation,
            if row.legendary { "Yes" } else { "No" }
        );
    }
}

fn render_pagination(out: &mut String, view: &PaginationView) {
    let prev = if view.prev_enabled { "<prev" } else { "     " };
    let next = if view.next_enabled { "next>" } else { "     " };
    let _ = writeln!(
        out,
        "{}  {}  {}   Items per page: {}   {}",
        prev,
        view.page_label(),
        next,
        view.page_size,
        view.total_label()
    );
}

pub fn render_types(state: &TypeCatalogState) -> String {
    if let Some(error) = &state.error {
        return error.clone();
    }

    type_options(&state.types)
        .iter()
        .map(|option| option.label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPokedexApi;
    use crate::models::DEFAULT_IMAGE_BASE_URL;
    use crate::repository::MemoryPreferencesRepository;
    use std::sync::Arc;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("next").unwrap(), Command::Next);
        assert_eq!(Command::parse("  PAGE 4 ").unwrap(), Command::Page(4));
        assert_eq!(Command::parse("size 20").unwrap(), Command::Size(20));
        assert_eq!(Command::parse("filter Fire").unwrap(), Command::Filter("fire".to_string()));
        assert_eq!(Command::parse("filter").unwrap(), Command::Filter(String::new()));
        assert_eq!(Command::parse("filter all").unwrap(), Command::Filter(String::new()));
        assert_eq!(Command::parse("toggle 25").unwrap(), Command::Toggle(25));
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for line in ["", "dance", "page", "page two", "size 7", "toggle 1 2"] {
            assert!(
                matches!(Command::parse(line), Err(PokedexError::InvalidCommand(_))),
                "expected '{}' to be rejected",
                line
            );
        }
    }

    #[test]
    fn test_render_types() {
        let state = TypeCatalogState {
            types: vec!["bug".to_string(), "fire".to_string()],
            loaded: true,
            ..TypeCatalogState::default()
        };
        assert_eq!(render_types(&state), "All, Bug, Fire");
    }

    #[tokio::test]
    async fn test_execute_navigation_and_toggle() {
        let api = Arc::new(MockPokedexApi::with_seed_data());
        let session = Session::new(
            api.clone(),
            Arc::new(MemoryPreferencesRepository::new()),
            DEFAULT_IMAGE_BASE_URL,
        );
        session.start().await.unwrap();

        let Reply::Text(text) = execute(&session, Command::Prev).await.unwrap() else {
            panic!("expected text");
        };
        assert_eq!(text, "Already on the first page.");

        let Reply::Text(text) = execute(&session, Command::Next).await.unwrap() else {
            panic!("expected text");
        };
        assert!(text.contains("Page 2 of 4"));
        assert!(text.contains("Caterpie"));

        let Reply::Text(text) = execute(&session, Command::Toggle(7)).await.unwrap() else {
            panic!("expected text");
        };
        assert_eq!(text, "#7 selected.");

        let Reply::Text(text) = execute(&session, Command::Toggle(1)).await.unwrap() else {
            panic!("expected text");
        };
        assert_eq!(text, "Pokémon not found: #1");

        assert_eq!(execute(&session, Command::Quit).await.unwrap(), Reply::Quit);
    }
}
