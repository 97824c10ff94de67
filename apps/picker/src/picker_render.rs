use std::fmt::Write as _;
use std::io;

use locus_application::{LocationList, PickerView};

const NO_RESULTS_MESSAGE: &str = "No results to display";
const PLACEHOLDER_ROW: &str = "( ) ░░░░░░░░░░░░░░░░";

/// Renders the view below a search prompt line.
fn render_view(search_text: &str, view: &PickerView) -> String {
    let mut output = format!("Search for a location: {search_text}\n");

    match view {
        PickerView::Loading { placeholders } => {
            for _ in 0..*placeholders {
                output.push_str(PLACEHOLDER_ROW);
                output.push('\n');
            }
        }
        PickerView::Error { message } => {
            let _ = writeln!(output, "Error: {message}");
        }
        PickerView::Empty => {
            output.push_str(NO_RESULTS_MESSAGE);
            output.push('\n');
        }
        PickerView::List(list) => render_list(&mut output, list),
    }

    output
}

/// Writes the rendered view and flushes, so piped output shows each update.
pub fn write_view(
    output: &mut impl io::Write,
    search_text: &str,
    view: &PickerView,
) -> io::Result<()> {
    output.write_all(render_view(search_text, view).as_bytes())?;
    output.flush()
}

fn render_list(output: &mut String, list: &LocationList) {
    for (index, location) in list.items.iter().enumerate() {
        let marker = if list.selected.as_ref() == Some(location.id()) {
            "(x)"
        } else {
            "( )"
        };
        let _ = writeln!(output, "{marker} {index:>3}  {}", location.name());
    }

    if list.loading_more {
        output.push_str("Loading...\n");
    } else if let Some(trigger_index) = list.trigger_index {
        let _ = writeln!(output, "More locations load once entry {trigger_index} is visible");
    }
}
