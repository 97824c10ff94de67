/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerCommand {
    /// Replace the search text; an empty line clears it.
    Search(String),
    /// Request the next page.
    More,
    /// Report the entry at the index as visible.
    Scroll(usize),
    /// Select the entry at the index.
    Select(usize),
    Quit,
    /// Unrecognised `:` command, with a hint for the user.
    Invalid(String),
}

impl PickerCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Self::Search(line.to_owned());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("more"), None, None) => Self::More,
            (Some("quit" | "q"), None, None) => Self::Quit,
            (Some("scroll"), Some(index), None) => {
                parse_index(index).map_or_else(|| invalid_index(index), Self::Scroll)
            }
            (Some("select"), Some(index), None) => {
                parse_index(index).map_or_else(|| invalid_index(index), Self::Select)
            }
            _ => Self::Invalid(format!(
                "unknown command ':{command}'; use :more, :scroll N, :select N or :quit"
            )),
        }
    }
}

fn parse_index(value: &str) -> Option<usize> {
    value.parse::<usize>().ok()
}

fn invalid_index(value: &str) -> PickerCommand {
    PickerCommand::Invalid(format!("'{value}' is not a list index"))
}
