use std::{
    io::{self, Write},
    sync::Arc,
};

use lookup_core::{LookupHandles, RegionContent, ResultRegion, TextField};
use tracing::warn;

/// Result region backed by the terminal: each replacement prints the new
/// content as a fresh block.
#[derive(Debug, Default)]
pub struct TerminalRegion;

impl ResultRegion for TerminalRegion {
    fn replace(&self, content: RegionContent) {
        if let Err(e) = write_content(&mut io::stdout().lock(), &content) {
            warn!(error = %e, "Failed to write result to terminal");
        }
    }
}

fn write_content(out: &mut impl Write, content: &RegionContent) -> io::Result<()> {
    writeln!(out, "{}", content.visible_text())?;
    out.flush()
}

/// The three page elements: a text field, this terminal, and whoever
/// triggers activations.
#[derive(Debug)]
pub struct Page {
    pub field: Arc<TextField>,
    pub handles: LookupHandles,
}

impl Page {
    pub fn new(initial: impl Into<String>) -> Self {
        let field = Arc::new(TextField::new(initial));
        let handles = LookupHandles::new(field.clone(), Arc::new(TerminalRegion));
        Self { field, handles }
    }
}
