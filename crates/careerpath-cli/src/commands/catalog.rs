//! The `careerpath catalog` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use careerpath_core::catalog::CareerCatalog;
use careerpath_core::model::Dimension;

pub fn execute(catalog_path: Option<PathBuf>) -> Result<()> {
    let catalog = CareerCatalog::load_or_builtin(catalog_path.as_deref())?;

    let mut dimensions = Table::new();
    dimensions.set_header(vec!["Code", "Type", "Description"]);
    for dimension in Dimension::ALL {
        let info = catalog.dimension_info(dimension);
        dimensions.add_row(vec![
            Cell::new(dimension),
            Cell::new(info.name),
            Cell::new(info.description),
        ]);
    }
    println!("{dimensions}");

    let mut careers = Table::new();
    careers.set_header(vec!["Career", "Type", "Ideal vector"]);
    for career in &catalog.careers {
        careers.add_row(vec![
            Cell::new(&career.name),
            Cell::new(&career.type_name),
            Cell::new(career.ideal_vector),
        ]);
    }
    println!("\n{careers}");
    println!("\n{} careers.", catalog.careers.len());

    Ok(())
}
