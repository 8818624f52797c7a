//! Interactive field selection.

use std::io::IsTerminal;

use dialoguer::Input;
use entra_user_export::{parse_selection, SelectionOutcome, UserField, EXIT_MENU_KEY};

use crate::error::{CliError, CliResult};

const BANNER: &str = "==============================";

/// Checks if both stdin and stdout are connected to a terminal.
pub fn is_interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Menu text listing every field plus the exit entry.
pub fn render_menu() -> String {
    let mut menu = String::new();
    menu.push_str(BANNER);
    menu.push('\n');
    menu.push_str("What do you want to parse? (multi-select)\n");
    for field in UserField::ALL {
        menu.push_str(&format!(
            "  {}. {} - {}\n",
            field.menu_key(),
            field.label(),
            field.description()
        ));
    }
    menu.push_str(&format!(
        "  {}. Nothing, let me go - Exit immediately\n",
        EXIT_MENU_KEY
    ));
    menu.push_str("Type numbers like 2,4,6 or \"all\". Press Enter for none.\n");
    menu.push_str(BANNER);
    menu
}

/// Shows the menu and asks until the input parses.
pub fn ask_selection() -> CliResult<SelectionOutcome> {
    println!("\n{}", render_menu());

    loop {
        let input: String = Input::new()
            .with_prompt("Selection")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CliError::Input(e.to_string()))?;

        match parse_selection(&input) {
            Ok(outcome) => return Ok(outcome),
            Err(e) => eprintln!("{e}"),
        }
    }
}
