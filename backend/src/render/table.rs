use std::fmt::Display;

use crate::{
    html_builder::escape_text,
    style::{StyledTable, TABLE_ID},
};

impl Display for StyledTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "<table id='{TABLE_ID}'>")?;
        if let Some(caption) = &self.caption {
            writeln!(f, "<caption>{caption}</caption>")?;
        }
        write!(f, "<thead><tr>")?;
        for header in &self.headers {
            write!(f, "<th>{}", escape_text(header.name))?;
            if let Some(charge) = header.charge {
                write!(f, "<sup>{charge}+</sup>")?;
            }
            write!(f, "</th>")?;
        }
        writeln!(f, "</tr></thead>")?;
        writeln!(f, "<tbody>")?;
        for row in &self.rows {
            write!(f, "<tr>")?;
            for cell in row {
                if cell.declarations.is_empty() {
                    write!(f, "<td>")?;
                } else {
                    write!(f, "<td style='{}'>", cell.style())?;
                }
                write!(f, "{}</td>", escape_text(&cell.text))?;
            }
            writeln!(f, "</tr>")?;
        }
        writeln!(f, "</tbody>")?;
        write!(f, "</table>")
    }
}
