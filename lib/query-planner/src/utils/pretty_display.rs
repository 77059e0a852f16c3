use std::fmt::{Formatter as FmtFormatter, Result as FmtResult};

pub fn get_indent(depth: usize) -> String {
    "  ".repeat(depth)
}

pub trait PrettyDisplay {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult;
}

/// Writes `text` line by line at the given depth.
pub fn write_indented(f: &mut FmtFormatter<'_>, text: &str, depth: usize) -> FmtResult {
    let indent = get_indent(depth);
    for line in text.lines() {
        writeln!(f, "{}{}", indent, line)?;
    }
    Ok(())
}
