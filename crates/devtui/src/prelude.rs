pub use crate::error::Error;
pub use crate::input::InputSource;

pub use anstream::eprintln;
pub use anstream::println;
pub use color_eyre::eyre::{eyre, Context, OptionExt, Result};
pub use std::format as f;

pub fn new_table() -> prettytable::Table {
    let mut table = prettytable::Table::new();

    let format = prettytable::format::FormatBuilder::new()
        .padding(1, 1)
        .build();

    table.set_format(format);

    table
}

/// Render labeled fields as a two-column table.
pub fn fields_table(fields: &[(&str, String)]) -> String {
    let mut table = new_table();
    for (label, value) in fields {
        table.add_row(prettytable::row![label, value]);
    }
    table.to_string()
}
