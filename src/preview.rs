use anyhow::Result;
use log::info;

use crate::{
    cli::PreviewArgs,
    io_utils,
    store::{CsvStore, GridStore},
    table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let store = CsvStore::new(&args.input)
        .with_delimiter(io_utils::resolve_delimiter(&args.input, args.delimiter))
        .with_input_encoding(encoding);
    let grid = store.load()?;
    table::print_grid(&grid, args.rows);
    info!(
        "Displayed {} of {} row(s) from {:?}",
        if args.rows == 0 {
            grid.row_count()
        } else {
            args.rows.min(grid.row_count())
        },
        grid.row_count(),
        args.input
    );
    Ok(())
}
